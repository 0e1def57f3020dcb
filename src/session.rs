use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::chat::{ChatError, Content};
use crate::news::{filter_ids, CategoryFilter, Comment, RecordStore};

pub const COMMENT_VALIDATION_MESSAGE: &str = "Nama dan komentar tidak boleh kosong.";
pub const NO_COMMENTS_PLACEHOLDER: &str = "Belum ada komentar.";
pub const EXPAND_LABEL: &str = "Baca selengkapnya";
pub const COLLAPSE_LABEL: &str = "Sembunyikan";
pub const CHAT_APOLOGY: &str =
    "Maaf, terjadi kendala saat menghubungi asisten sekolah. Silakan coba lagi.";

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("nama dan komentar tidak boleh kosong")]
    EmptyField,
}

/// Every user-triggered action, as a tagged command dispatched to [`reduce`].
/// Keeping the whole interactive surface behind one enum makes the session
/// deterministic to test without a terminal or a network.
#[derive(Debug)]
pub enum Command {
    SearchChanged(String),
    CategorySelected(CategoryFilter),
    ToggleRequested(u32),
    CommentSubmitted { id: u32, name: String, text: String },
    ChatSendRequested(String),
    ChatCompleted(Result<String, ChatError>),
}

/// Side effects the reducer asks the caller to perform. The reducer itself
/// never touches the network.
#[derive(Debug)]
pub enum Effect {
    DispatchChat { contents: Vec<Content> },
}

/// Feed-side UI state: active selector, live query, the last filter result,
/// and which record widgets are expanded.
pub struct FeedState {
    pub category: CategoryFilter,
    pub query: String,
    /// `None` until the first filter pass; `Some(vec![])` is a real
    /// "no matches" outcome and renders the empty-feed indicator.
    matches: Option<Vec<u32>>,
    expanded: HashSet<u32>,
    /// Inline validation message for one record's comment form. Cleared at
    /// the start of every submit attempt.
    comment_error: Option<(u32, &'static str)>,
}

impl FeedState {
    fn new() -> Self {
        Self {
            category: CategoryFilter::All,
            query: String::new(),
            matches: None,
            expanded: HashSet::new(),
            comment_error: None,
        }
    }

    pub fn matches(&self) -> Option<&[u32]> {
        self.matches.as_deref()
    }

    pub fn is_expanded(&self, id: u32) -> bool {
        self.expanded.contains(&id)
    }

    /// Label of the toggle control, reflecting the action a press performs.
    pub fn toggle_label(&self, id: u32) -> &'static str {
        if self.is_expanded(id) {
            COLLAPSE_LABEL
        } else {
            EXPAND_LABEL
        }
    }

    pub fn comment_error(&self, id: u32) -> Option<&'static str> {
        self.comment_error
            .and_then(|(record, message)| (record == id).then_some(message))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
    /// Inline failure notices shown in the transcript but never replayed to
    /// the endpoint as model turns.
    Notice,
}

pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// Conversation state: the visible transcript and the history replayed to
/// the endpoint on every send. The history is unbounded and never trimmed,
/// so the outbound payload grows for the lifetime of the session.
pub struct ChatLog {
    transcript: Vec<TranscriptEntry>,
    history: Vec<Content>,
    pending: usize,
    last_error: Option<String>,
}

impl ChatLog {
    fn new() -> Self {
        Self {
            transcript: Vec::new(),
            history: Vec::new(),
            pending: 0,
            last_error: None,
        }
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn is_pending(&self) -> bool {
        self.pending > 0
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn append(&mut self, speaker: Speaker, text: String) {
        self.transcript.push(TranscriptEntry {
            speaker,
            text,
            at: Utc::now(),
        });
    }
}

/// Top-level session owning the record store, feed state, and chat state.
/// All mutation flows through [`reduce`] on the event-loop thread.
pub struct Session {
    store: RecordStore,
    pub feed: FeedState,
    pub chat: ChatLog,
}

impl Session {
    pub fn new(store: RecordStore) -> Self {
        let mut session = Self {
            store,
            feed: FeedState::new(),
            chat: ChatLog::new(),
        };
        session.refresh_feed();
        session
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    fn refresh_feed(&mut self) {
        self.feed.matches = Some(filter_ids(
            self.store.records(),
            &self.feed.category,
            &self.feed.query,
        ));
    }

    fn toggle(&mut self, id: u32) {
        if self.store.get(id).is_none() {
            return;
        }
        if self.feed.expanded.remove(&id) {
            // Collapsing hides the comment section without clearing
            // submitted comments; the stale form error goes away with it.
            if self.feed.comment_error.map(|(record, _)| record) == Some(id) {
                self.feed.comment_error = None;
            }
        } else {
            self.feed.expanded.insert(id);
        }
    }

    /// Appends a comment after trimming and presence checks. A lookup miss
    /// is a no-op: the UI only ever submits ids of rendered widgets.
    fn submit_comment(&mut self, id: u32, name: &str, text: &str) -> Result<(), ValidationError> {
        self.feed.comment_error = None;

        let name = name.trim();
        let text = text.trim();
        if name.is_empty() || text.is_empty() {
            self.feed.comment_error = Some((id, COMMENT_VALIDATION_MESSAGE));
            return Err(ValidationError::EmptyField);
        }

        if let Some(record) = self.store.get_mut(id) {
            record.comments.push(Comment {
                name: name.to_string(),
                text: text.to_string(),
                date: Utc::now(),
            });
        }
        Ok(())
    }

    fn request_chat(&mut self, text: String) -> Vec<Effect> {
        let text = text.trim();
        if text.is_empty() {
            // Dropped silently: no transcript change, no outbound request.
            return Vec::new();
        }

        self.chat.append(Speaker::User, text.to_string());
        self.chat.history.push(Content::user(text));
        self.chat.pending += 1;

        vec![Effect::DispatchChat {
            contents: self.chat.history.clone(),
        }]
    }

    fn complete_chat(&mut self, result: Result<String, ChatError>) {
        self.chat.pending = self.chat.pending.saturating_sub(1);
        match result {
            Ok(reply) => {
                self.chat.history.push(Content::model(reply.clone()));
                self.chat.append(Speaker::Assistant, reply);
            }
            Err(err) => {
                // The apology is transcript-only; failures are never
                // replayed to the endpoint as model turns.
                self.chat.last_error = Some(err.to_string());
                self.chat.append(Speaker::Notice, CHAT_APOLOGY.to_string());
            }
        }
    }
}

pub fn reduce(session: &mut Session, command: Command) -> Vec<Effect> {
    match command {
        Command::SearchChanged(query) => {
            session.feed.query = query.trim().to_string();
            session.refresh_feed();
            Vec::new()
        }
        Command::CategorySelected(filter) => {
            session.feed.category = filter;
            session.refresh_feed();
            Vec::new()
        }
        Command::ToggleRequested(id) => {
            session.toggle(id);
            Vec::new()
        }
        Command::CommentSubmitted { id, name, text } => {
            // Failure is surfaced inline via the feed state; nothing else
            // to do here.
            let _ = session.submit_comment(id, &name, &text);
            Vec::new()
        }
        Command::ChatSendRequested(text) => session.request_chat(text),
        Command::ChatCompleted(result) => {
            session.complete_chat(result);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::news::NewsRecord;
    use chrono::NaiveDate;

    fn record(id: u32, category: &str) -> NewsRecord {
        NewsRecord {
            id,
            title: format!("Berita {id}"),
            category: category.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            image: String::new(),
            snippet: format!("ringkasan {id}"),
            content: format!("isi berita {id}"),
            comments: Vec::new(),
        }
    }

    fn session() -> Session {
        Session::new(RecordStore::new(vec![
            record(1, "Pengumuman"),
            record(2, "Kegiatan"),
            record(3, "Pengumuman"),
        ]))
    }

    #[test]
    fn fresh_feed_state_has_no_filter_result() {
        let state = FeedState::new();
        assert!(state.matches().is_none());
    }

    #[test]
    fn new_session_shows_every_record() {
        let session = session();
        assert_eq!(session.feed.matches(), Some(&[1, 2, 3][..]));
    }

    #[test]
    fn category_selection_filters_in_store_order() {
        let mut session = session();
        reduce(
            &mut session,
            Command::CategorySelected(CategoryFilter::from_label("Pengumuman")),
        );
        assert_eq!(session.feed.matches(), Some(&[1, 3][..]));
    }

    #[test]
    fn search_with_no_hits_is_an_empty_result_not_unfiltered() {
        let mut session = session();
        reduce(&mut session, Command::SearchChanged("tidak ada".into()));
        assert_eq!(session.feed.matches(), Some(&[][..]));
    }

    #[test]
    fn search_query_is_trimmed() {
        let mut session = session();
        reduce(&mut session, Command::SearchChanged("  berita 2  ".into()));
        assert_eq!(session.feed.query, "berita 2");
        assert_eq!(session.feed.matches(), Some(&[2][..]));
    }

    #[test]
    fn toggle_twice_restores_collapsed_and_label() {
        let mut session = session();
        assert_eq!(session.feed.toggle_label(1), EXPAND_LABEL);

        reduce(&mut session, Command::ToggleRequested(1));
        assert!(session.feed.is_expanded(1));
        assert_eq!(session.feed.toggle_label(1), COLLAPSE_LABEL);
        // State transitions are local to one record.
        assert!(!session.feed.is_expanded(2));

        reduce(&mut session, Command::ToggleRequested(1));
        assert!(!session.feed.is_expanded(1));
        assert_eq!(session.feed.toggle_label(1), EXPAND_LABEL);
    }

    #[test]
    fn toggle_of_unknown_id_is_a_noop() {
        let mut session = session();
        reduce(&mut session, Command::ToggleRequested(99));
        assert!(!session.feed.is_expanded(99));
    }

    #[test]
    fn collapsing_keeps_submitted_comments() {
        let mut session = session();
        reduce(&mut session, Command::ToggleRequested(1));
        reduce(
            &mut session,
            Command::CommentSubmitted {
                id: 1,
                name: "Budi".into(),
                text: "Mantap!".into(),
            },
        );
        reduce(&mut session, Command::ToggleRequested(1));
        assert_eq!(session.store().get(1).unwrap().comments.len(), 1);
    }

    #[test]
    fn empty_comment_field_rejects_without_mutation() {
        let mut session = session();
        for (name, text) in [("", "isi"), ("Budi", ""), ("   ", "isi"), ("Budi", "  ")] {
            reduce(
                &mut session,
                Command::CommentSubmitted {
                    id: 1,
                    name: name.into(),
                    text: text.into(),
                },
            );
            assert!(session.store().get(1).unwrap().comments.is_empty());
            assert_eq!(
                session.feed.comment_error(1),
                Some(COMMENT_VALIDATION_MESSAGE)
            );
        }
    }

    #[test]
    fn valid_comment_appends_exactly_one_and_clears_error() {
        let mut session = session();
        reduce(
            &mut session,
            Command::CommentSubmitted {
                id: 2,
                name: "Siti".into(),
                text: "".into(),
            },
        );
        assert!(session.feed.comment_error(2).is_some());

        let before = Utc::now();
        reduce(
            &mut session,
            Command::CommentSubmitted {
                id: 2,
                name: "  Siti  ".into(),
                text: "  Terima kasih.  ".into(),
            },
        );
        let comments = &session.store().get(2).unwrap().comments;
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].name, "Siti");
        assert_eq!(comments[0].text, "Terima kasih.");
        assert!(comments[0].date >= before);
        assert!(session.feed.comment_error(2).is_none());
    }

    #[test]
    fn comment_for_unknown_record_is_a_noop() {
        let mut session = session();
        reduce(
            &mut session,
            Command::CommentSubmitted {
                id: 42,
                name: "Budi".into(),
                text: "Halo".into(),
            },
        );
        for record in session.store().records() {
            assert!(record.comments.is_empty());
        }
    }

    #[test]
    fn blank_chat_send_produces_nothing() {
        let mut session = session();
        for text in ["", "   ", "\t\n"] {
            let effects = reduce(&mut session, Command::ChatSendRequested(text.into()));
            assert!(effects.is_empty());
        }
        assert!(session.chat.transcript().is_empty());
        assert_eq!(session.chat.history_len(), 0);
    }

    #[test]
    fn chat_send_snapshots_full_history() {
        let mut session = session();
        reduce(&mut session, Command::ChatSendRequested("halo".into()));
        reduce(
            &mut session,
            Command::ChatCompleted(Ok("Halo juga!".into())),
        );

        let effects = reduce(&mut session, Command::ChatSendRequested("jadwal?".into()));
        let [Effect::DispatchChat { contents }] = &effects[..] else {
            panic!("expected one dispatch effect");
        };
        // user, model, user.
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[2].parts[0].text, "jadwal?");
        assert!(session.chat.is_pending());
    }

    #[test]
    fn chat_success_appends_model_turn() {
        let mut session = session();
        reduce(&mut session, Command::ChatSendRequested("halo".into()));
        reduce(
            &mut session,
            Command::ChatCompleted(Ok("Selamat pagi!".into())),
        );

        assert!(!session.chat.is_pending());
        assert_eq!(session.chat.history_len(), 2);
        let transcript = session.chat.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[1].speaker, Speaker::Assistant);
        assert_eq!(transcript[1].text, "Selamat pagi!");
    }

    #[test]
    fn chat_failure_adds_one_apology_and_no_model_turn() {
        let mut session = session();
        reduce(&mut session, Command::ChatSendRequested("halo".into()));
        let history_before = session.chat.history_len();

        reduce(
            &mut session,
            Command::ChatCompleted(Err(ChatError::Malformed("response has no candidates"))),
        );

        let transcript = session.chat.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[1].speaker, Speaker::Notice);
        assert_eq!(transcript[1].text, CHAT_APOLOGY);
        assert_eq!(session.chat.history_len(), history_before);
        assert!(session.chat.last_error().is_some());
        assert!(!session.chat.is_pending());
    }

    #[test]
    fn overlapping_sends_apply_in_completion_order() {
        let mut session = session();
        reduce(&mut session, Command::ChatSendRequested("pertama".into()));
        reduce(&mut session, Command::ChatSendRequested("kedua".into()));
        assert!(session.chat.is_pending());

        // Completions may interleave; transcript order is completion order.
        reduce(
            &mut session,
            Command::ChatCompleted(Ok("balasan kedua".into())),
        );
        reduce(
            &mut session,
            Command::ChatCompleted(Ok("balasan pertama".into())),
        );

        let texts: Vec<&str> = session
            .chat
            .transcript()
            .iter()
            .map(|entry| entry.text.as_str())
            .collect();
        assert_eq!(
            texts,
            ["pertama", "kedua", "balasan kedua", "balasan pertama"]
        );
        assert!(!session.chat.is_pending());
        assert_eq!(session.chat.history_len(), 4);
    }
}
