use course_core::model::ModuleId;
use course_core::progress::ProgressSummary;
use services::{ModuleOverview, ViewerSnapshot};

/// UI-ready module tile for the course overview.
#[derive(Clone, Debug, PartialEq)]
pub struct ModuleCardVm {
    pub id: ModuleId,
    pub title: String,
    pub description: String,
    pub progress_label: String,
    pub percent_label: String,
    /// CSS width of the progress bar fill.
    pub bar_width: String,
    pub completed: bool,
}

impl From<&ModuleOverview> for ModuleCardVm {
    fn from(overview: &ModuleOverview) -> Self {
        let progress = overview.progress;
        Self {
            id: overview.module.id(),
            title: overview.module.title().to_owned(),
            description: overview.module.description().to_owned(),
            progress_label: format!(
                "{} of {} lessons complete",
                progress.completed, progress.total
            ),
            percent_label: percent_label(progress),
            bar_width: format!("{:.1}%", progress.percent()),
            completed: progress.is_complete(),
        }
    }
}

#[must_use]
pub fn map_module_cards(modules: &[ModuleOverview]) -> Vec<ModuleCardVm> {
    modules.iter().map(ModuleCardVm::from).collect()
}

/// Overall progress and account state shown in the header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderVm {
    pub percent_label: String,
    pub lessons_label: String,
    pub signed_in: bool,
    pub account_label: Option<String>,
}

#[must_use]
pub fn map_header(snapshot: &ViewerSnapshot) -> HeaderVm {
    let overall = snapshot.overall;
    HeaderVm {
        percent_label: percent_label(overall),
        lessons_label: format!("{} of {}", overall.completed, overall.total),
        signed_in: snapshot.account.is_some(),
        account_label: snapshot
            .account
            .as_ref()
            .and_then(|account| account.email.clone()),
    }
}

fn percent_label(summary: ProgressSummary) -> String {
    format!("{}%", summary.rounded_percent())
}
