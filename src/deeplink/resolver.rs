use super::StartupAction;
use crate::builder::{AutoSave, BuilderSession, EditGuard, SessionError};
use crate::flow::FlowId;
use crate::remote::ApiError;

/// User-facing outcome of a startup import. Deep links are best effort:
/// every failure becomes a dismissible notice, never a hard error, and the
/// triggering parameter is already consumed either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupNotice {
    FlowLoaded { id: String },
    SignInToLoad,
    FlowUnavailable,
    ShareLinkExpired,
    UnsavedChangesBlockedImport,
    ItemsNotIncluded { dropped: usize },
    CloneSaved { id: String, title: String },
    CloneUnsaved { title: String },
    CloneAwaitingSignIn { title: String },
}

impl StartupNotice {
    pub fn summary(&self) -> String {
        match self {
            Self::FlowLoaded { id } => format!("loaded flow {id}"),
            Self::SignInToLoad => "sign in to load this flow".to_string(),
            Self::FlowUnavailable => "that flow is no longer available".to_string(),
            Self::ShareLinkExpired => "this share link has expired".to_string(),
            Self::UnsavedChangesBlockedImport => {
                "finish or discard your unsaved changes first".to_string()
            }
            Self::ItemsNotIncluded { dropped } => {
                format!("{dropped} items were not included")
            }
            Self::CloneSaved { title, .. } => format!("saved a copy as \"{title}\""),
            Self::CloneUnsaved { title } => {
                format!("\"{title}\" is ready but not saved yet")
            }
            Self::CloneAwaitingSignIn { title } => {
                format!("\"{title}\" is ready; sign in to save it")
            }
        }
    }
}

/// Runs the one-shot startup import against the session. The action was
/// already consumed from the entry parameters, so nothing here can replay.
pub fn resolve_startup(session: &mut BuilderSession, action: StartupAction) -> Vec<StartupNotice> {
    match action {
        StartupAction::LoadOwnedFlow { id } => resolve_owned_load(session, &id),
        StartupAction::ClonePublicFlow { slug } => resolve_public_clone(session, &slug),
    }
}

fn resolve_owned_load(session: &mut BuilderSession, raw_id: &str) -> Vec<StartupNotice> {
    let id = match FlowId::parse(raw_id) {
        Ok(id) => id,
        Err(_) => return vec![StartupNotice::FlowUnavailable],
    };
    match session.load_owned(&id, EditGuard::KeepEdits) {
        Ok(()) => vec![StartupNotice::FlowLoaded {
            id: id.as_str().to_string(),
        }],
        Err(SessionError::Api(ApiError::AuthRequired)) => vec![StartupNotice::SignInToLoad],
        Err(SessionError::UnsavedChanges) => vec![StartupNotice::UnsavedChangesBlockedImport],
        Err(_) => vec![StartupNotice::FlowUnavailable],
    }
}

fn resolve_public_clone(session: &mut BuilderSession, slug: &str) -> Vec<StartupNotice> {
    let outcome = match session.clone_public(slug, EditGuard::KeepEdits) {
        Ok(outcome) => outcome,
        Err(SessionError::Api(ApiError::ExpiredLink)) => {
            return vec![StartupNotice::ShareLinkExpired]
        }
        Err(SessionError::Api(ApiError::AuthRequired)) => return vec![StartupNotice::SignInToLoad],
        Err(SessionError::UnsavedChanges) => {
            return vec![StartupNotice::UnsavedChangesBlockedImport]
        }
        Err(_) => return vec![StartupNotice::FlowUnavailable],
    };

    let mut notices = Vec::new();
    if outcome.items_dropped > 0 {
        notices.push(StartupNotice::ItemsNotIncluded {
            dropped: outcome.items_dropped,
        });
    }
    notices.push(match outcome.auto_save {
        AutoSave::Saved { id } => StartupNotice::CloneSaved {
            id: id.as_str().to_string(),
            title: outcome.title,
        },
        AutoSave::Failed { .. } => StartupNotice::CloneUnsaved {
            title: outcome.title,
        },
        AutoSave::NotAttempted => StartupNotice::CloneAwaitingSignIn {
            title: outcome.title,
        },
    });
    notices
}
