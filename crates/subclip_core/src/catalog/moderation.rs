//! Admin moderation with optimistic local updates.
//!
//! A [`ModerationCommand`] describes one change. [`OptimisticList::run`]
//! applies it to the list on screen first, then executes it against the
//! backend and restores the previous list if the backend refuses.

use super::backend::{sort_requests, sort_submissions, CatalogBackend};
use super::error::{CatalogError, CatalogResult};
use super::types::{
    Clip, ClipStatus, Comment, CommentStatus, RequestStatus, SubmissionStatus,
    SubtitleSubmission, TranslationRequest,
};

/// One moderation action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationCommand {
    SetClipStatus { id: String, status: ClipStatus },
    DeleteClip { id: String },
    SetCommentStatus { id: String, status: CommentStatus },
    DeleteComment { id: String },
    SetSubmissionStatus { id: String, status: SubmissionStatus },
    DeleteSubmission { id: String },
    SetRequestStatus { id: String, status: RequestStatus },
    SetRequestPriority { id: String, priority: i32 },
    DeleteRequest { id: String },
}

impl ModerationCommand {
    /// Id of the record the command changes.
    pub fn target_id(&self) -> &str {
        match self {
            Self::SetClipStatus { id, .. }
            | Self::DeleteClip { id }
            | Self::SetCommentStatus { id, .. }
            | Self::DeleteComment { id }
            | Self::SetSubmissionStatus { id, .. }
            | Self::DeleteSubmission { id }
            | Self::SetRequestStatus { id, .. }
            | Self::SetRequestPriority { id, .. }
            | Self::DeleteRequest { id } => id,
        }
    }

    pub fn is_delete(&self) -> bool {
        matches!(
            self,
            Self::DeleteClip { .. }
                | Self::DeleteComment { .. }
                | Self::DeleteSubmission { .. }
                | Self::DeleteRequest { .. }
        )
    }

    /// Short description used in permission errors and logs.
    pub fn action(&self) -> &'static str {
        match self {
            Self::SetClipStatus { .. } => "change clip status",
            Self::DeleteClip { .. } => "delete clips",
            Self::SetCommentStatus { .. } => "moderate comments",
            Self::DeleteComment { .. } => "delete comments",
            Self::SetSubmissionStatus { .. } => "review submissions",
            Self::DeleteSubmission { .. } => "delete submissions",
            Self::SetRequestStatus { .. } => "update requests",
            Self::SetRequestPriority { .. } => "prioritize requests",
            Self::DeleteRequest { .. } => "delete requests",
        }
    }

    /// Confirmation shown to the admin after the backend accepts.
    pub fn success_message(&self) -> &'static str {
        match self {
            Self::SetClipStatus { .. } => "Status do clipe atualizado",
            Self::DeleteClip { .. } => "Clipe excluído",
            Self::SetCommentStatus { .. } => "Comentário atualizado",
            Self::DeleteComment { .. } => "Comentário excluído",
            Self::SetSubmissionStatus { .. } => "Status atualizado com sucesso!",
            Self::DeleteSubmission { .. } => "Envio excluído",
            Self::SetRequestStatus { .. } => "Status atualizado com sucesso!",
            Self::SetRequestPriority { .. } => "Prioridade atualizada",
            Self::DeleteRequest { .. } => "Solicitação excluída",
        }
    }

    /// Execute against the backend.
    pub fn execute(&self, backend: &dyn CatalogBackend) -> CatalogResult<()> {
        match self {
            Self::SetClipStatus { id, status } => backend.set_clip_status(id, *status),
            Self::DeleteClip { id } => backend.delete_clip(id),
            Self::SetCommentStatus { id, status } => backend.set_comment_status(id, *status),
            Self::DeleteComment { id } => backend.delete_comment(id),
            Self::SetSubmissionStatus { id, status } => backend.set_submission_status(id, *status),
            Self::DeleteSubmission { id } => backend.delete_submission(id),
            Self::SetRequestStatus { id, status } => backend.set_request_status(id, *status),
            Self::SetRequestPriority { id, priority } => backend.set_request_priority(id, *priority),
            Self::DeleteRequest { id } => backend.delete_request(id),
        }
    }
}

/// A record type that moderation commands can change locally.
pub trait Moderated: Clone {
    /// Name used in errors.
    const KIND: &'static str;

    fn id(&self) -> &str;

    /// Apply a non-delete command. Returns `false` when the command is
    /// meant for another record type.
    fn apply(&mut self, command: &ModerationCommand) -> bool;

    /// Whether `command` deletes this record type.
    fn deleted_by(command: &ModerationCommand) -> bool;

    /// Restore display order after a change.
    fn reorder(_items: &mut [Self]) {}
}

impl Moderated for Clip {
    const KIND: &'static str = "Clip";

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&mut self, command: &ModerationCommand) -> bool {
        match command {
            ModerationCommand::SetClipStatus { status, .. } => {
                self.status = *status;
                true
            }
            _ => false,
        }
    }

    fn deleted_by(command: &ModerationCommand) -> bool {
        matches!(command, ModerationCommand::DeleteClip { .. })
    }
}

impl Moderated for Comment {
    const KIND: &'static str = "Comment";

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&mut self, command: &ModerationCommand) -> bool {
        match command {
            ModerationCommand::SetCommentStatus { status, .. } => {
                self.status = *status;
                true
            }
            _ => false,
        }
    }

    fn deleted_by(command: &ModerationCommand) -> bool {
        matches!(command, ModerationCommand::DeleteComment { .. })
    }
}

impl Moderated for SubtitleSubmission {
    const KIND: &'static str = "Submission";

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&mut self, command: &ModerationCommand) -> bool {
        match command {
            ModerationCommand::SetSubmissionStatus { status, .. } => {
                self.status = *status;
                true
            }
            _ => false,
        }
    }

    fn deleted_by(command: &ModerationCommand) -> bool {
        matches!(command, ModerationCommand::DeleteSubmission { .. })
    }

    fn reorder(items: &mut [Self]) {
        sort_submissions(items);
    }
}

impl Moderated for TranslationRequest {
    const KIND: &'static str = "Request";

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&mut self, command: &ModerationCommand) -> bool {
        match command {
            ModerationCommand::SetRequestStatus { status, .. } => {
                self.status = *status;
                true
            }
            ModerationCommand::SetRequestPriority { priority, .. } => {
                self.priority = *priority;
                true
            }
            _ => false,
        }
    }

    fn deleted_by(command: &ModerationCommand) -> bool {
        matches!(command, ModerationCommand::DeleteRequest { .. })
    }

    fn reorder(items: &mut [Self]) {
        sort_requests(items);
    }
}

/// Result of running a command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// Local change kept; the backend accepted it.
    Applied,
    /// Local list is unchanged from before the command.
    RolledBack(CatalogError),
}

impl CommandOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, CommandOutcome::Applied)
    }
}

/// A list shown in an admin screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptimisticList<T> {
    items: Vec<T>,
}

impl<T: Moderated> OptimisticList<T> {
    pub fn new(mut items: Vec<T>) -> Self {
        T::reorder(&mut items);
        Self { items }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Replace the contents with a fresh backend listing.
    pub fn reload(&mut self, items: Vec<T>) {
        *self = Self::new(items);
    }

    /// Apply `command` locally, then on the backend; undo on failure.
    ///
    /// Commands for an unknown id or another record type are rejected
    /// without calling the backend.
    pub fn run(&mut self, command: &ModerationCommand, backend: &dyn CatalogBackend) -> CommandOutcome {
        let snapshot = self.items.clone();
        if let Err(e) = self.apply_local(command) {
            return CommandOutcome::RolledBack(e);
        }

        match command.execute(backend) {
            Ok(()) => {
                tracing::debug!("[Moderation] {} {}: applied", T::KIND, command.target_id());
                CommandOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(
                    "[Moderation] {} {}: backend refused ({}), rolling back",
                    T::KIND,
                    command.target_id(),
                    e
                );
                self.items = snapshot;
                CommandOutcome::RolledBack(e)
            }
        }
    }

    fn apply_local(&mut self, command: &ModerationCommand) -> CatalogResult<()> {
        let id = command.target_id();
        let index = self
            .items
            .iter()
            .position(|item| item.id() == id)
            .ok_or_else(|| CatalogError::not_found(T::KIND, id))?;

        if T::deleted_by(command) {
            self.items.remove(index);
        } else if !self.items[index].apply(command) {
            return Err(CatalogError::validation(
                "command",
                format!("cannot {} on a {}", command.action(), T::KIND.to_lowercase()),
            ));
        }
        T::reorder(&mut self.items);
        Ok(())
    }
}
