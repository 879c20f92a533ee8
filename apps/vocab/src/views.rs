//! Plain-text renderings of the routed views.

use client_core::{Route, WordPoolSnapshot};
use shared::domain::Word;

pub fn render(route: Route, snapshot: &WordPoolSnapshot, pick: Option<&Word>) -> String {
    match route {
        Route::ArticleReader => render_article_reader(snapshot),
        Route::WordPool => render_pool(&snapshot.words),
        Route::Review => render_card(pick),
        Route::NotFound => "no view is bound to this path".to_string(),
    }
}

fn render_article_reader(snapshot: &WordPoolSnapshot) -> String {
    format!(
        "[{}] {} word(s) in pool",
        Route::ArticleReader.view_name(),
        snapshot.words.len()
    )
}

pub fn render_pool(words: &[Word]) -> String {
    if words.is_empty() {
        return "word pool is empty".to_string();
    }

    let width = words.iter().map(|w| w.word.chars().count()).max().unwrap_or(0);
    words
        .iter()
        .map(|w| {
            let definition = if w.definition.is_empty() {
                "-"
            } else {
                w.definition.as_str()
            };
            format!(
                "{:<width$}  {}  (reviewed {})",
                w.word,
                definition,
                w.reviewed,
                width = width
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_card(word: Option<&Word>) -> String {
    match word {
        Some(w) if w.definition.is_empty() => format!("{}\n  (no definition yet)", w.word),
        Some(w) => format!("{}\n  {}", w.word, w.definition),
        None => "no words yet".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_rows_are_aligned() {
        let words = vec![Word::new("cat", "a pet"), Word::new("giraffe", "")];
        assert_eq!(
            render_pool(&words),
            "cat      a pet  (reviewed 0)\ngiraffe  -  (reviewed 0)"
        );
    }

    #[test]
    fn empty_views_say_so() {
        let snapshot = WordPoolSnapshot::default();
        assert_eq!(render(Route::WordPool, &snapshot, None), "word pool is empty");
        assert_eq!(render(Route::Review, &snapshot, None), "no words yet");
        assert_eq!(
            render(Route::ArticleReader, &snapshot, None),
            "[ArticleReader] 0 word(s) in pool"
        );
    }

    #[test]
    fn review_card_shows_definition() {
        let word = Word::new("fox", "a canid");
        assert_eq!(render_card(Some(&word)), "fox\n  a canid");
    }
}
