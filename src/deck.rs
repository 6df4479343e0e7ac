//! The prompts of a game and how they are drawn.
//!
//! A [`Deck`] is built once per game out of the selected categories. It is
//! never exhausted: once the cursor runs past the last prompt, the deck is
//! shuffled again and drawing restarts from the top.
use std::fmt;

use crate::category::CategoryStore;

const IMAGE_EXTENSIONS: [&str; 4] = [".jpg", ".jpeg", ".png", ".gif"];

/// Something a player must make the others guess.
///
/// Either a word or the path to an image, see [`Prompt::is_image_ref`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Prompt(String);
impl Prompt {
    pub fn new(content: impl Into<String>) -> Self {
        Self(content.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
    /// Missing or empty prompts can't be shown and are skipped.
    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
    /// Whether the prompt names an image file rather than a word.
    pub fn is_image_ref(&self) -> bool {
        let lower = self.0.to_lowercase();
        IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
    }
}
impl From<Option<String>> for Prompt {
    fn from(content: Option<String>) -> Self {
        Self(content.unwrap_or_default())
    }
}
impl From<&str> for Prompt {
    fn from(content: &str) -> Self {
        Self::new(content)
    }
}
impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a game could not start.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StartError {
    /// No category was selected.
    EmptySelection,
    /// The selected categories have no prompts.
    EmptyDeck,
}
impl fmt::Display for StartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartError::EmptySelection => write!(f, "Select at least one category!"),
            StartError::EmptyDeck => write!(f, "The selected categories are empty."),
        }
    }
}
impl std::error::Error for StartError {}

/// Uniform in-place Fisher-Yates shuffle.
pub fn shuffle<T>(items: &mut [T], rng: &fastrand::Rng) {
    for i in (1..items.len()).rev() {
        let j = rng.usize(..=i);
        items.swap(i, j);
    }
}

/// Concatenate the prompts of `selected` categories and shuffle them.
///
/// Ids missing from `store` (a category which failed to load) are ignored.
pub fn build_deck(
    selected: &[String],
    store: &CategoryStore,
    rng: &fastrand::Rng,
) -> Result<Vec<Prompt>, StartError> {
    if selected.is_empty() {
        return Err(StartError::EmptySelection);
    }
    let mut prompts: Vec<Prompt> = selected
        .iter()
        .filter_map(|id| store.get(id))
        .flat_map(|category| category.prompts.iter().cloned())
        .collect();
    if prompts.is_empty() {
        return Err(StartError::EmptyDeck);
    }
    shuffle(&mut prompts, rng);
    Ok(prompts)
}

/// Cyclic deck of prompts with a draw cursor.
pub struct Deck {
    prompts: Vec<Prompt>,
    cursor: usize,
    rng: fastrand::Rng,
}
impl Deck {
    pub fn new(prompts: Vec<Prompt>, rng: fastrand::Rng) -> Self {
        Self { prompts, cursor: 0, rng }
    }
    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }
    pub fn cursor(&self) -> usize {
        self.cursor
    }
    pub fn prompts(&self) -> &[Prompt] {
        &self.prompts
    }
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }
    pub fn advance(&mut self) {
        self.cursor += 1;
    }
    /// The prompt under the cursor, reshuffling first if the cursor ran
    /// past the end. `None` only for an empty deck.
    pub fn current(&mut self) -> Option<&Prompt> {
        if self.prompts.is_empty() {
            return None;
        }
        if self.cursor >= self.prompts.len() {
            shuffle(&mut self.prompts, &self.rng);
            self.cursor = 0;
        }
        self.prompts.get(self.cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CategoryData;

    macro_rules! store {
        ($($id:literal => [$($prompt:literal),*]),* $(,)?) => {{
            let mut store = CategoryStore::default();
            $(
                let prompts = vec![$(Some($prompt.to_string())),*];
                store.register($id, CategoryData { display_name: $id.to_uppercase(), prompts });
            )*
            store
        }};
    }
    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }
    fn sorted(prompts: &[Prompt]) -> Vec<&str> {
        let mut all: Vec<_> = prompts.iter().map(Prompt::as_str).collect();
        all.sort_unstable();
        all
    }

    #[test]
    fn deck_is_the_union_of_selected_categories() {
        let store = store! {
            "animals" => ["cat", "dog", "cat"],
            "food" => ["pizza"],
            "cities" => ["Lima", "Oslo"],
        };
        let rng = fastrand::Rng::with_seed(7);
        let deck = build_deck(&ids(&["animals", "food"]), &store, &rng).unwrap();
        assert_eq!(deck.len(), 4);
        assert_eq!(sorted(&deck), ["cat", "cat", "dog", "pizza"]);
    }

    #[test]
    fn unknown_categories_are_skipped() {
        let store = store! { "food" => ["pizza", "soup"] };
        let rng = fastrand::Rng::with_seed(1);
        let deck = build_deck(&ids(&["never-loaded", "food"]), &store, &rng).unwrap();
        assert_eq!(sorted(&deck), ["pizza", "soup"]);
    }

    #[test]
    fn empty_selection_fails() {
        let store = store! { "food" => ["pizza"] };
        let rng = fastrand::Rng::with_seed(1);
        assert_eq!(build_deck(&[], &store, &rng), Err(StartError::EmptySelection));
    }

    #[test]
    fn empty_categories_fail() {
        let store = store! { "void" => [], "nothing" => [] };
        let rng = fastrand::Rng::with_seed(1);
        let selected = ids(&["void", "nothing"]);
        assert_eq!(build_deck(&selected, &store, &rng), Err(StartError::EmptyDeck));
        let selected = ids(&["not-there"]);
        assert_eq!(build_deck(&selected, &store, &rng), Err(StartError::EmptyDeck));
    }

    #[test]
    fn build_deck_leaves_store_alone() {
        let store = store! { "letters" => ["a", "b", "c", "d", "e", "f"] };
        let rng = fastrand::Rng::with_seed(3);
        build_deck(&ids(&["letters"]), &store, &rng).unwrap();
        let original: Vec<_> = store.get("letters").unwrap().prompts.iter().map(Prompt::as_str).collect();
        assert_eq!(original, ["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let rng = fastrand::Rng::with_seed(42);
        let mut items: Vec<u32> = (0..100).collect();
        shuffle(&mut items, &rng);
        assert_ne!(items, (0..100).collect::<Vec<_>>());
        items.sort_unstable();
        assert_eq!(items, (0..100).collect::<Vec<_>>());

        let mut single = [1];
        shuffle(&mut single, &rng);
        let mut none: [u8; 0] = [];
        shuffle(&mut none, &rng);
    }

    #[test]
    fn cursor_wraps_with_reshuffle() {
        let prompts: Vec<Prompt> = ["a", "b", "c"].into_iter().map(Prompt::from).collect();
        let mut deck = Deck::new(prompts, fastrand::Rng::with_seed(5));
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(deck.current().unwrap().clone());
            deck.advance();
        }
        assert_eq!(deck.cursor(), 3);
        assert!(deck.current().is_some());
        assert_eq!(deck.cursor(), 0);
        assert_eq!(sorted(deck.prompts()), ["a", "b", "c"]);
        assert_eq!(sorted(&seen), ["a", "b", "c"]);
    }

    #[test]
    fn empty_deck_has_no_current() {
        let mut deck = Deck::new(Vec::new(), fastrand::Rng::with_seed(5));
        assert_eq!(deck.current(), None);
        deck.advance();
        assert_eq!(deck.current(), None);
    }

    #[test]
    fn image_refs() {
        assert!(Prompt::new("img/owl.png").is_image_ref());
        assert!(Prompt::new("img/OWL.JPEG").is_image_ref());
        assert!(Prompt::new("a.Gif").is_image_ref());
        assert!(Prompt::new("b.jpg").is_image_ref());
        assert!(!Prompt::new("png").is_image_ref());
        assert!(!Prompt::new("owl.png.txt").is_image_ref());
        assert!(!Prompt::new("Penguin").is_image_ref());
    }

    #[test]
    fn blank_prompts() {
        assert!(Prompt::from(None).is_blank());
        assert!(Prompt::new("").is_blank());
        assert!(!Prompt::new("   ").is_blank());
        assert!(!Prompt::new("x").is_blank());
    }
}
