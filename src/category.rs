//! Category data: loading `.category` files and keeping them around.
//!
//! Each category is a JSON file in the configured folder:
//!
//! ```json
//! { "displayName": "Animals", "prompts": ["Cat", "Dog", "images/owl.png"] }
//! ```
//!
//! All files are requested through the [`AssetServer`] when the game
//! boots. Some may never show up (missing file, broken JSON), which is
//! fine: the [`CategoryStore`] is only filled once *every* request has
//! either loaded or failed, failed ones just contribute nothing.
use bevy::asset::{AssetLoader, LoadContext, LoadState, LoadedAsset};
use bevy::prelude::{Plugin as BevyPlugin, *};
use bevy::reflect::TypeUuid;
use bevy::utils::BoxedFuture;
use serde::Deserialize;

use crate::{config::GameConfig, deck::Prompt, state::GameState};

/// What a category file contains.
#[derive(Deserialize, TypeUuid, Debug, Clone, Default, PartialEq)]
#[uuid = "5b0c2f1e-8f3a-4d39-9a47-1c3e6f2b7d84"]
#[serde(default, rename_all = "camelCase")]
pub struct CategoryData {
    pub display_name: String,
    /// `null` entries are kept as blank prompts, they are skipped in game.
    pub prompts: Vec<Option<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: String,
    pub display_name: String,
    pub prompts: Vec<Prompt>,
}

/// Every category known to the game, in registration order.
#[derive(Default, Debug)]
pub struct CategoryStore {
    categories: Vec<Category>,
}
impl CategoryStore {
    /// Add a category, replacing any previous one with the same `id`.
    ///
    /// Returns `false` (and stores nothing) when `id` is blank.
    pub fn register(&mut self, id: &str, data: CategoryData) -> bool {
        if id.trim().is_empty() {
            warn!("refusing to register a category without id ({:?})", data.display_name);
            return false;
        }
        let prompts = data.prompts.into_iter().map(Prompt::from).collect();
        let category = Category { id: id.to_owned(), display_name: data.display_name, prompts };
        info!("category loaded: {} ({})", category.display_name, category.id);
        match self.categories.iter_mut().find(|c| c.id == id) {
            Some(existing) => *existing = category,
            None => self.categories.push(category),
        }
        true
    }
    pub fn get(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }
    /// Categories that can be offered to players, those with a name.
    pub fn listed(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(|c| !c.display_name.trim().is_empty())
    }
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Outcome of loading all configured category files.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub attempted: usize,
    pub loaded: usize,
    /// Ids of categories that could not be loaded.
    pub failed: Vec<String>,
}

/// Decide whether all loads are over.
///
/// Returns `None` while at least one load is still in flight, otherwise
/// the ids which loaded successfully and the final report.
pub fn settle<'a, I>(states: I) -> Option<(Vec<&'a str>, LoadReport)>
where
    I: IntoIterator<Item = (&'a str, LoadState)>,
{
    let mut report = LoadReport::default();
    let mut loaded = Vec::new();
    for (id, state) in states {
        report.attempted += 1;
        match state {
            LoadState::Loaded => loaded.push(id),
            LoadState::Failed | LoadState::Unloaded => report.failed.push(id.to_owned()),
            LoadState::NotLoaded | LoadState::Loading => return None,
        }
    }
    report.loaded = loaded.len();
    Some((loaded, report))
}

#[derive(Default)]
pub struct CategoryLoader;
impl AssetLoader for CategoryLoader {
    fn load<'a>(
        &'a self,
        bytes: &'a [u8],
        load_context: &'a mut LoadContext,
    ) -> BoxedFuture<'a, Result<(), anyhow::Error>> {
        Box::pin(async move {
            let data: CategoryData = serde_json::from_slice(bytes)?;
            load_context.set_default_asset(LoadedAsset::new(data));
            Ok(())
        })
    }
    fn extensions(&self) -> &[&str] {
        &["category"]
    }
}

/// Category files currently being loaded.
struct PendingLoads(Vec<(String, Handle<CategoryData>)>);

fn request_categories(
    mut cmds: Commands,
    asset_server: Res<AssetServer>,
    config: Res<GameConfig>,
) {
    info!("loading {} category files", config.category_files.len());
    let handles = config
        .category_files
        .iter()
        .map(|id| (id.clone(), asset_server.load(&config.category_path(id))))
        .collect();
    cmds.insert_resource(PendingLoads(handles));
}

fn collect_categories(
    mut cmds: Commands,
    mut store: ResMut<CategoryStore>,
    mut state: ResMut<State<GameState>>,
    pending: Option<Res<PendingLoads>>,
    asset_server: Res<AssetServer>,
    mut datas: ResMut<Assets<CategoryData>>,
) {
    let pending = match pending {
        Some(pending) => pending,
        None => return,
    };
    let states = pending
        .0
        .iter()
        .map(|(id, handle)| (id.as_str(), asset_server.get_load_state(handle)));
    let (loaded, mut report) = match settle(states) {
        Some(settled) => settled,
        None => return,
    };
    for id in loaded {
        let handle = pending.0.iter().find(|(i, _)| i == id).map(|(_, h)| h);
        match handle.and_then(|h| datas.remove(h)) {
            Some(data) => {
                store.register(id, data);
            }
            None => {
                report.loaded -= 1;
                report.failed.push(id.to_owned());
            }
        }
    }
    for id in &report.failed {
        warn!("could not load category file for '{id}'");
    }
    info!("category loading done, loaded {} / {}", report.loaded, report.attempted);
    cmds.remove_resource::<PendingLoads>();
    cmds.insert_resource(report);
    state.set(GameState::Setup).unwrap();
}

pub struct Plugin;
impl BevyPlugin for Plugin {
    fn build(&self, app: &mut App) {
        use crate::state::EasySystemSetCtor;
        app.add_asset::<CategoryData>()
            .init_asset_loader::<CategoryLoader>()
            .init_resource::<CategoryStore>()
            .init_resource::<LoadReport>()
            .add_system_set(GameState::Loading.on_enter(request_categories))
            .add_system_set(GameState::Loading.on_update(collect_categories));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(name: &str, prompts: &[&str]) -> CategoryData {
        CategoryData {
            display_name: name.to_owned(),
            prompts: prompts.iter().map(|p| Some(p.to_string())).collect(),
        }
    }

    #[test]
    fn parse_category_file() {
        let json = r#"{ "displayName": "Animals", "prompts": ["Cat", null, "owl.PNG"] }"#;
        let parsed: CategoryData = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.display_name, "Animals");
        assert_eq!(parsed.prompts, vec![Some("Cat".into()), None, Some("owl.PNG".into())]);

        let parsed: CategoryData = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, CategoryData::default());
    }

    #[test]
    fn register_and_replace() {
        let mut store = CategoryStore::default();
        assert!(store.register("animals", data("Animals", &["Cat"])));
        assert!(store.register("food", data("Food", &["Pizza"])));
        assert!(store.register("animals", data("Animals", &["Cat", "Dog"])));
        assert_eq!(store.get("animals").unwrap().prompts.len(), 2);
        let ids: Vec<_> = store.listed().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["animals", "food"]);
    }

    #[test]
    fn blank_id_is_rejected() {
        let mut store = CategoryStore::default();
        assert!(!store.register("  ", data("Nothing", &["x"])));
        assert!(store.is_empty());
    }

    #[test]
    fn nameless_categories_are_not_listed() {
        let mut store = CategoryStore::default();
        store.register("hidden", data("", &["x"]));
        store.register("shown", data("Shown", &["y"]));
        assert_eq!(store.listed().count(), 1);
        assert!(store.get("hidden").is_some());
    }

    #[test]
    fn settle_waits_for_every_load() {
        use LoadState::*;
        assert_eq!(settle([("a", Loaded), ("b", Loading)]), None);
        assert_eq!(settle([("a", NotLoaded), ("b", Failed)]), None);

        let (loaded, report) = settle([("a", Loaded), ("b", Failed), ("c", Loaded)]).unwrap();
        assert_eq!(loaded, ["a", "c"]);
        assert_eq!(report, LoadReport { attempted: 3, loaded: 2, failed: vec!["b".into()] });
    }

    #[test]
    fn settle_with_nothing_to_load() {
        let (loaded, report) = settle(std::iter::empty()).unwrap();
        assert!(loaded.is_empty());
        assert_eq!(report.attempted, 0);
    }
}
