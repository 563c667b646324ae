//! Application context shared by the catalog screens.
//!
//! [`AppContext`] owns the backend handle, the signed-in profile and the
//! toast queue. Screens go through it for anything that needs a
//! permission check or user feedback.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::config::BackendSettings;

use super::backend::{CatalogBackend, MemoryBackend};
use super::error::{CatalogError, CatalogResult};
use super::intake::{CommentForm, RequestForm, SubmissionForm};
use super::moderation::{CommandOutcome, ModerationCommand, Moderated, OptimisticList};
use super::types::{Comment, SubtitleSubmission, TranslationRequest, UserProfile};

/// How long a toast stays visible.
pub const TOAST_TTL: Duration = Duration::from_millis(4000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Info,
    Warning,
}

/// A transient notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
    pub created: Instant,
}

/// Notifications that expire after a fixed time.
#[derive(Debug, Clone)]
pub struct ToastQueue {
    toasts: Vec<Toast>,
    next_id: u64,
    ttl: Duration,
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::with_ttl(TOAST_TTL)
    }
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            toasts: Vec::new(),
            next_id: 1,
            ttl,
        }
    }

    /// Add a toast created at `now`. Returns its id.
    pub fn push_at(&mut self, kind: ToastKind, message: impl Into<String>, now: Instant) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.toasts.push(Toast {
            id,
            kind,
            message: message.into(),
            created: now,
        });
        id
    }

    pub fn push(&mut self, kind: ToastKind, message: impl Into<String>) -> u64 {
        self.push_at(kind, message, Instant::now())
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Success, message)
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Error, message)
    }

    pub fn info(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Info, message)
    }

    pub fn warning(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Warning, message)
    }

    /// Close a toast before it expires.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.id != id);
        self.toasts.len() != before
    }

    /// Drop expired toasts and return the rest, oldest first.
    pub fn active_at(&mut self, now: Instant) -> &[Toast] {
        let ttl = self.ttl;
        self.toasts
            .retain(|t| now.saturating_duration_since(t.created) < ttl);
        &self.toasts
    }

    pub fn active(&mut self) -> &[Toast] {
        self.active_at(Instant::now())
    }

    /// Most recent toast, expired or not.
    pub fn last(&self) -> Option<&Toast> {
        self.toasts.last()
    }
}

/// Shared state for one user session.
pub struct AppContext {
    backend: Arc<dyn CatalogBackend>,
    identity: Option<UserProfile>,
    pub toasts: ToastQueue,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("identity", &self.identity)
            .field("toasts", &self.toasts)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    pub fn new(backend: Arc<dyn CatalogBackend>) -> Self {
        Self {
            backend,
            identity: None,
            toasts: ToastQueue::new(),
        }
    }

    /// Context for the configured backend.
    ///
    /// Only the in-process backend ships with this crate, so a configured
    /// remote backend still runs on demo data with a warning.
    pub fn from_settings(settings: &BackendSettings) -> Self {
        if settings.is_demo_mode() {
            tracing::info!("[Catalog] No backend configured, running in demo mode");
        } else {
            tracing::warn!(
                "[Catalog] Remote backend '{}' is not supported here, using demo data",
                settings.url
            );
        }
        Self::new(Arc::new(MemoryBackend::demo()))
    }

    pub fn backend(&self) -> &dyn CatalogBackend {
        self.backend.as_ref()
    }

    /// Load the profile for `user_id` and make it the current identity.
    pub fn sign_in(&mut self, user_id: &str) -> CatalogResult<&UserProfile> {
        let profile = self
            .backend
            .get_profile(user_id)?
            .ok_or_else(|| CatalogError::not_found("Profile", user_id))?;
        tracing::info!("[Auth] Signed in as {}", profile.email);
        Ok(self.identity.insert(profile))
    }

    pub fn sign_out(&mut self) {
        if let Some(profile) = self.identity.take() {
            tracing::info!("[Auth] Signed out {}", profile.email);
        }
    }

    pub fn identity(&self) -> Option<&UserProfile> {
        self.identity.as_ref()
    }

    pub fn is_admin(&self) -> bool {
        self.identity.as_ref().is_some_and(UserProfile::is_admin)
    }

    /// The signed-in admin, or [`CatalogError::Forbidden`].
    pub fn require_admin(&self, action: &str) -> CatalogResult<&UserProfile> {
        self.identity
            .as_ref()
            .filter(|p| p.is_admin())
            .ok_or_else(|| CatalogError::forbidden(action))
    }

    /// Run a moderation command on a list as the current user.
    ///
    /// Non-admins are refused before anything changes. A toast reports
    /// the outcome either way.
    pub fn moderate<T: Moderated>(
        &mut self,
        list: &mut OptimisticList<T>,
        command: &ModerationCommand,
    ) -> CommandOutcome {
        if let Some(e) = self.require_admin(command.action()).err() {
            self.toasts.error(e.user_message());
            return CommandOutcome::RolledBack(e);
        }

        let outcome = list.run(command, self.backend.as_ref());
        match &outcome {
            CommandOutcome::Applied => {
                self.toasts.success(command.success_message());
            }
            CommandOutcome::RolledBack(e) => {
                self.toasts.error(format!("Erro: {}", e.user_message()));
            }
        }
        outcome
    }

    /// Validate and store a translation request from the public form.
    pub fn submit_request(&mut self, form: RequestForm) -> CatalogResult<TranslationRequest> {
        let result = TranslationRequest::new(form).and_then(|r| self.backend.add_request(r));
        self.report(&result, "Solicitação enviada com sucesso!");
        result
    }

    /// Validate and store subtitles sent by a visitor.
    pub fn submit_subtitles(&mut self, form: SubmissionForm) -> CatalogResult<SubtitleSubmission> {
        let result = SubtitleSubmission::new(form).and_then(|s| self.backend.add_submission(s));
        self.report(&result, "Legendas enviadas! Obrigado pela contribuição.");
        result
    }

    /// Post a comment. It stays hidden until approved.
    pub fn post_comment(&mut self, form: CommentForm) -> CatalogResult<Comment> {
        let result = Comment::new(form).and_then(|c| self.backend.add_comment(c));
        self.report(&result, "Comentário enviado para moderação");
        result
    }

    fn report<T>(&mut self, result: &CatalogResult<T>, success: &str) {
        match result {
            Ok(_) => {
                self.toasts.success(success);
            }
            Err(e) => {
                tracing::warn!("[Catalog] {}", e);
                self.toasts.error(e.user_message());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::{RequestStatus, Role};

    fn profile(id: &str, role: Role) -> UserProfile {
        UserProfile {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            full_name: None,
            avatar_url: None,
            role,
        }
    }

    fn context() -> (Arc<MemoryBackend>, AppContext) {
        let backend = Arc::new(MemoryBackend::demo());
        backend.add_profile(profile("admin", Role::Admin));
        backend.add_profile(profile("visitor", Role::User));
        let ctx = AppContext::new(backend.clone());
        (backend, ctx)
    }

    const URL: &str = "https://youtu.be/dQw4w9WgXcQ";

    #[test]
    fn toasts_expire_after_ttl() {
        let mut queue = ToastQueue::new();
        let start = Instant::now();
        queue.push_at(ToastKind::Info, "first", start);
        queue.push_at(ToastKind::Warning, "second", start + Duration::from_secs(2));

        assert_eq!(queue.active_at(start + Duration::from_millis(3999)).len(), 2);
        let remaining = queue.active_at(start + Duration::from_millis(4000));
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].message, "second");
        assert!(queue.active_at(start + Duration::from_secs(7)).is_empty());
    }

    #[test]
    fn toasts_can_be_dismissed() {
        let mut queue = ToastQueue::new();
        let id = queue.success("saved");
        queue.error("failed");
        assert!(queue.dismiss(id));
        assert!(!queue.dismiss(id));
        assert_eq!(queue.last().map(|t| t.kind), Some(ToastKind::Error));
    }

    #[test]
    fn moderation_requires_admin() {
        let (backend, mut ctx) = context();
        let mut clips = OptimisticList::new(backend.list_clips().unwrap());
        let command = ModerationCommand::DeleteClip { id: "demo-1".into() };

        let outcome = ctx.moderate(&mut clips, &command);
        assert!(matches!(outcome, CommandOutcome::RolledBack(CatalogError::Forbidden { .. })));
        assert_eq!(clips.len(), 5);
        assert_eq!(
            ctx.toasts.last().map(|t| t.message.as_str()),
            Some("Apenas administradores podem fazer isso")
        );

        ctx.sign_in("visitor").unwrap();
        assert!(!ctx.is_admin());
        assert!(!ctx.moderate(&mut clips, &command).is_applied());

        ctx.sign_in("admin").unwrap();
        assert!(ctx.moderate(&mut clips, &command).is_applied());
        assert_eq!(clips.len(), 4);
        assert_eq!(ctx.toasts.last().map(|t| t.kind), Some(ToastKind::Success));
        assert!(backend.get_clip("demo-1").is_err());
    }

    #[test]
    fn rollback_reports_error_toast() {
        let (backend, mut ctx) = context();
        ctx.sign_in("admin").unwrap();
        let request = ctx
            .submit_request(RequestForm {
                youtube_url: URL.into(),
                ..Default::default()
            })
            .unwrap();

        let mut requests = OptimisticList::new(backend.list_requests().unwrap());
        backend.set_offline(true);
        let outcome = ctx.moderate(
            &mut requests,
            &ModerationCommand::SetRequestStatus {
                id: request.id.clone(),
                status: RequestStatus::Completed,
            },
        );
        assert!(!outcome.is_applied());
        assert_eq!(requests.get(&request.id).unwrap().status, RequestStatus::Pending);
        assert_eq!(ctx.toasts.last().map(|t| t.kind), Some(ToastKind::Error));
    }

    #[test]
    fn public_forms_store_and_toast() {
        let (backend, mut ctx) = context();

        ctx.submit_subtitles(SubmissionForm {
            youtube_url: URL.into(),
            srt_content: "1\n00:00:01,000 --> 00:00:02,000\nOi\n".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(backend.list_submissions().unwrap().len(), 1);

        let err = ctx.submit_request(RequestForm::default()).unwrap_err();
        assert!(matches!(err, CatalogError::Validation { .. }));
        assert_eq!(ctx.toasts.last().map(|t| t.kind), Some(ToastKind::Error));
        assert_eq!(
            ctx.toasts.last().map(|t| t.message.as_str()),
            Some("Verifique o campo link do YouTube")
        );
        assert!(backend.list_requests().unwrap().is_empty());

        let comment = ctx
            .post_comment(CommentForm {
                clip_id: "demo-2".into(),
                author: "Carla".into(),
                rating: 4,
                content: "Ótimo".into(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(backend.list_comments(Some("demo-2")).unwrap(), vec![comment]);
    }

    #[test]
    fn sign_in_unknown_user_fails() {
        let (_, mut ctx) = context();
        assert!(matches!(
            ctx.sign_in("ghost"),
            Err(CatalogError::NotFound { kind: "Profile", .. })
        ));
        assert!(ctx.identity().is_none());
        ctx.sign_in("admin").unwrap();
        ctx.sign_out();
        assert!(!ctx.is_admin());
    }

    #[test]
    fn settings_without_url_use_demo_data() {
        let ctx = AppContext::from_settings(&BackendSettings::default());
        assert_eq!(ctx.backend().list_clips().unwrap().len(), 5);
    }
}
