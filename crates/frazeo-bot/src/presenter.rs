use frazeo_core::{
    emphasize, escape_markdown, Control, ControlLayout, FrazeoError, FrazeoResult, IdiomId, IdiomRecord,
};
use frazeo_session::{SessionStore, Snapshot};
use std::sync::Arc;

/// Keycap markers for list positions 1..=10.
pub const ORDINALS: [&str; 10] = [
    "1️⃣", "2️⃣", "3️⃣", "4️⃣", "5️⃣", "6️⃣", "7️⃣", "8️⃣", "9️⃣", "🔟",
];

/// Ordinal buttons per keyboard row.
pub const ITEMS_PER_ROW: usize = 5;

/// Caption of the control restoring the previous screen.
pub const BACK_LABEL: &str = "⬅ Back";
/// Caption of the control restoring the conversation's last search.
pub const SEARCH_AGAIN_LABEL: &str = "🔎 Back to search";
/// Caption of the "surprise me" control.
pub const RANDOM_LABEL: &str = "🎲 Random idiom";
/// Payload of the "back to search" control. Not hex, so never a token.
pub const SEARCH_AGAIN_PAYLOAD: &str = "search";
/// Payload of the random control. The id is drawn when it is pressed, so
/// the same screen always gets the same keyboard.
pub const RANDOM_PAYLOAD: &str = "random";

/// Marker for the zero-based list position `i`.
pub fn ordinal(i: usize) -> String {
    ORDINALS
        .get(i)
        .map_or_else(|| format!("{}.", i + 1), |s| (*s).to_string())
}

/// One line per record: marker, emphasized phrase, definition.
pub fn render_list<'a>(records: impl IntoIterator<Item = &'a IdiomRecord>) -> String {
    records
        .into_iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "{} {} — {}\n",
                ordinal(i),
                emphasize("*", &r.phrase.to_uppercase()),
                escape_markdown(&r.definition)
            )
        })
        .collect()
}

/// Emphasized phrase with the definition on an indented line.
pub fn render_detail(record: &IdiomRecord) -> String {
    format!(
        "{}\n\t{}",
        emphasize("*", &record.phrase.to_uppercase()),
        escape_markdown(&record.definition)
    )
}

/// Header plus list for a top-level search.
pub fn render_search(query: &str, records: &[&IdiomRecord]) -> String {
    format!(
        "🔎 {}\n\n{}",
        emphasize("*", query.trim()),
        render_list(records.iter().copied())
    )
}

/// Turns result lists into inline keyboards whose payloads are tokens.
///
/// Every payload is a precomputed id token, a freshly stashed snapshot token,
/// [`SEARCH_AGAIN_PAYLOAD`] or [`RANDOM_PAYLOAD`], so each one fits the
/// transport's callback size limit regardless of how large the screen is.
pub struct Presenter {
    store: Arc<SessionStore>,
}

impl Presenter {
    /// Build controls against the given session store.
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self { store }
    }

    /// Lay out the controls for a screen listing `ids`.
    ///
    /// A `back` snapshot is stashed in the session store and wired to a
    /// leading back control. `search_again` adds the "back to search" control
    /// next to the trailing random control.
    pub fn build_controls(
        &self,
        ids: &[IdiomId],
        back: Option<Snapshot>,
        search_again: bool,
    ) -> FrazeoResult<ControlLayout> {
        let registry = self.store.registry();
        let mut layout = ControlLayout::new();

        if let Some(snapshot) = back {
            let token = self.store.stash(snapshot)?;
            layout.push_row(vec![Control::new(BACK_LABEL, token.as_str())]);
        }

        let mut items = Vec::with_capacity(ids.len());
        for (i, &id) in ids.iter().enumerate() {
            let token = registry.id_token(id).ok_or_else(|| {
                FrazeoError::Session(format!("no token for id {id} (id-space {})", registry.id_space()))
            })?;
            items.push(Control::new(ordinal(i), token.as_str()));
        }
        for row in items.chunks(ITEMS_PER_ROW) {
            layout.push_row(row.to_vec());
        }

        let mut tail = Vec::with_capacity(2);
        if search_again {
            tail.push(Control::new(SEARCH_AGAIN_LABEL, SEARCH_AGAIN_PAYLOAD));
        }
        if registry.id_space() > 0 {
            tail.push(Control::new(RANDOM_LABEL, RANDOM_PAYLOAD));
        }
        layout.push_row(tail);

        Ok(layout)
    }

    /// A layout holding only the random control.
    pub fn random_only(&self) -> FrazeoResult<ControlLayout> {
        self.build_controls(&[], None, false)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use frazeo_session::{Salt, SessionLimits, TokenRegistry};

    fn presenter(corpus_size: usize) -> (Presenter, Arc<SessionStore>) {
        let registry = Arc::new(TokenRegistry::for_corpus(&Salt::new("-"), corpus_size).unwrap());
        let store = Arc::new(SessionStore::new(registry, &SessionLimits::default()));
        (Presenter::new(store.clone()), store)
    }

    #[test]
    fn test_ordinal() {
        assert_eq!(ordinal(0), "1️⃣");
        assert_eq!(ordinal(9), "🔟");
        assert_eq!(ordinal(10), "11.");
    }

    #[test]
    fn test_render_list() {
        let records = [
            IdiomRecord::new("бить баклуши", "to idle"),
            IdiomRecord::new("кот наплакал", "very little"),
        ];
        assert_eq!(
            render_list(&records),
            "1️⃣ *БИТЬ БАКЛУШИ* — to idle\n2️⃣ *КОТ НАПЛАКАЛ* — very little\n"
        );
        assert_eq!(render_list(&[] as &[IdiomRecord]), "");
    }

    #[test]
    fn test_render_detail() {
        let record = IdiomRecord::new("кот наплакал", "very_little");
        assert_eq!(render_detail(&record), "*КОТ НАПЛАКАЛ*\n\tvery\\_little");
    }

    #[test]
    fn test_emphasized_phrase_is_not_escaped() {
        let record = IdiomRecord::new("a_b", "c_d");
        assert_eq!(render_detail(&record), "*A_B*\n\tc\\_d");
        assert_eq!(render_list([&record]), "1️⃣ *A_B* — c\\_d\n");
    }

    #[test]
    fn test_render_search_header() {
        let record = IdiomRecord::new("a", "b");
        assert_eq!(render_search("  q*  ", &[&record]), "🔎 *q*\\*\n\n1️⃣ *A* — b\n");
    }

    #[test]
    fn test_build_controls_rows_and_tail() {
        let (presenter, store) = presenter(12);
        let ids: Vec<IdiomId> = (0..7).collect();
        let layout = presenter.build_controls(&ids, None, false).unwrap();

        assert_eq!(layout.rows.len(), 3);
        assert_eq!(layout.rows[0].len(), 5);
        assert_eq!(layout.rows[1].len(), 2);
        assert_eq!(layout.rows[2].len(), 1);
        assert_eq!(layout.rows[2][0].label, RANDOM_LABEL);
        assert_eq!(layout.rows[2][0].payload, RANDOM_PAYLOAD);

        for (i, control) in layout.rows.iter().take(2).flatten().enumerate() {
            assert_eq!(control.label, ordinal(i));
            assert_eq!(store.registry().resolve_id(&control.payload), Some(ids[i]));
        }
        assert_eq!(store.snapshot_count(), 0);
    }

    #[test]
    fn test_build_controls_with_back_and_search() {
        let (presenter, store) = presenter(3);
        let back = Snapshot::new("previous", None);
        let layout = presenter.build_controls(&[1], Some(back.clone()), true).unwrap();

        let back_control = &layout.rows[0][0];
        assert_eq!(back_control.label, BACK_LABEL);
        assert_eq!(*store.snapshot(&back_control.payload).unwrap(), back);

        let tail = layout.rows.last().unwrap();
        assert_eq!(tail[0].label, SEARCH_AGAIN_LABEL);
        assert_eq!(tail[0].payload, SEARCH_AGAIN_PAYLOAD);
        assert_eq!(tail[1].label, RANDOM_LABEL);
    }

    #[test]
    fn test_all_payloads_fit_callback_limit() {
        let (presenter, _) = presenter(10);
        let ids: Vec<IdiomId> = (0..10).collect();
        let layout = presenter
            .build_controls(&ids, Some(Snapshot::new("x".repeat(4096), None)), true)
            .unwrap();
        assert!(layout.controls().all(|c| c.payload.len() <= 64));
    }

    #[test]
    fn test_unknown_id_is_an_error() {
        let (presenter, _) = presenter(2);
        assert!(matches!(
            presenter.build_controls(&[5], None, false),
            Err(FrazeoError::Session(_))
        ));
    }
}
