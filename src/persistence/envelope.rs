//! Versioned save document
//!
//! Save format changelog:
//! v1: bricks reference overlays by `overlayId`; every overlay is listed in
//!     `inventory.overlays` with its id
//! v2: bricks embed `overlayData`; `inventory.overlays` holds only detached overlays
//!
//! Import checks the envelope first and fails before building anything. After
//! that each section is read on its own and a missing or broken section falls
//! back to its default instead of rejecting the save.

use std::collections::BTreeMap;

use glam::IVec2;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::migration::LegacyOverlayIndex;
use crate::board::{Board, Brick, BrickKind, OverlayKind};
use crate::consts::SAVE_VERSION;
use crate::enchant::{BallKind, EnchantOutcome};
use crate::equipment::{self, EquipmentRef};
use crate::error::{CoreError, CoreResult};
use crate::progression::PlayerProgression;
use crate::resources::ResourceKind;
use crate::settings::Settings;
use crate::state::{GameEvent, GameState};

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDocument {
    pub version: u32,
    /// Unix time (ms) the save was written
    #[serde(default)]
    pub timestamp: u64,
    #[serde(default)]
    pub progression: PlayerProgression,
    #[serde(default)]
    pub resources: BTreeMap<String, f64>,
    #[serde(default)]
    pub inventory: InventoryRecord,
    /// Ball id -> outcome ids in the order they were rolled
    #[serde(default)]
    pub enchantments: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub home_base: HomeBaseRecord,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InventoryRecord {
    pub items: BTreeMap<String, u32>,
    pub overlays: Vec<OverlayRecord>,
    pub equipment: Vec<EquipmentRef>,
    pub unlocked_slots: BTreeMap<String, u32>,
}

/// An overlay listed in the inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayRecord {
    /// Only written by version 1 saves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(rename = "type")]
    pub kind: OverlayKind,
    #[serde(default = "one")]
    pub level: u32,
}

/// Overlay stored inline on its host brick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayData {
    #[serde(rename = "type")]
    pub kind: OverlayKind,
    #[serde(default = "one")]
    pub level: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeBaseRecord {
    pub bricks: Vec<BrickRecord>,
}

/// One placed brick; `c`/`r` are relative to the board center
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrickRecord {
    pub c: i32,
    pub r: i32,
    #[serde(rename = "type")]
    pub kind: BrickKind,
    #[serde(default = "one")]
    pub level: u32,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub health: Option<f64>,
    #[serde(default)]
    pub max_health: Option<f64>,
    #[serde(default)]
    pub coins: Option<f64>,
    #[serde(default)]
    pub max_coins: Option<f64>,
    #[serde(default)]
    pub gems: Option<f64>,
    #[serde(default)]
    pub max_gems: Option<f64>,
    #[serde(default)]
    pub overlay_data: Option<OverlayData>,
    /// Version 1 link into `inventory.overlays`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay_id: Option<u32>,
}

impl BrickRecord {
    fn from_brick(brick: &Brick, board: &Board) -> Self {
        let pos = board.grid_to_centered(brick.anchor);
        Self {
            c: pos.x,
            r: pos.y,
            kind: brick.kind,
            level: brick.level,
            width: Some(brick.size.x),
            height: Some(brick.size.y),
            health: Some(brick.health),
            max_health: Some(brick.max_health),
            coins: Some(brick.coins),
            max_coins: Some(brick.max_coins),
            gems: Some(brick.gems),
            max_gems: Some(brick.max_gems),
            overlay_data: board.overlay_on(brick.id).map(|o| OverlayData {
                kind: o.kind,
                level: o.level,
            }),
            overlay_id: None,
        }
    }

    /// Brick with stored values over the defaults for its kind and level
    fn to_brick(&self) -> Brick {
        fn clean(v: Option<f64>, default: f64) -> f64 {
            v.filter(|x| x.is_finite()).map_or(default, |x| x.max(0.0))
        }

        let mut brick = Brick::new(self.kind, self.level);
        let size = brick.size;
        brick = brick.with_size(self.width.unwrap_or(size.x), self.height.unwrap_or(size.y));
        brick.max_health = clean(self.max_health, brick.max_health);
        brick.health = clean(self.health, brick.max_health).min(brick.max_health);
        brick.max_coins = clean(self.max_coins, brick.max_coins);
        brick.coins = clean(self.coins, brick.max_coins).min(brick.max_coins);
        brick.max_gems = clean(self.max_gems, brick.max_gems);
        brick.gems = clean(self.gems, brick.max_gems).min(brick.max_gems);
        brick
    }
}

/// Snapshot the persistent parts of a game state
pub fn export(state: &GameState, timestamp: u64) -> SaveDocument {
    let board = state.board();
    let inventory = InventoryRecord {
        items: state
            .inventory
            .items()
            .map(|(id, n)| (id.to_string(), n))
            .collect(),
        // Attached overlays travel inline with their brick
        overlays: board
            .overlays()
            .unattached()
            .map(|o| OverlayRecord {
                id: None,
                kind: o.kind,
                level: o.level,
            })
            .collect(),
        equipment: state
            .inventory
            .equipment()
            .iter()
            .map(EquipmentRef::from)
            .collect(),
        unlocked_slots: state
            .inventory
            .slot_counts()
            .map(|(ball, n)| (ball.as_str().to_string(), n))
            .collect(),
    };

    SaveDocument {
        version: SAVE_VERSION,
        timestamp,
        progression: state.progression.clone(),
        resources: state
            .resources
            .iter()
            .map(|(kind, amount)| (kind.as_str().to_string(), amount))
            .collect(),
        inventory,
        enchantments: state
            .enchantments
            .iter()
            .map(|(ball, s)| {
                let ids = s.history.iter().map(|o| o.as_str().to_string()).collect();
                (ball.as_str().to_string(), ids)
            })
            .collect(),
        home_base: HomeBaseRecord {
            bricks: board
                .bricks()
                .map(|b| BrickRecord::from_brick(b, board))
                .collect(),
        },
    }
}

/// Export as pretty-printed JSON
pub fn export_json(state: &GameState, timestamp: u64) -> CoreResult<String> {
    let doc = export(state, timestamp);
    let json = serde_json::to_string_pretty(&doc)?;
    log::info!(
        "Exported save v{} ({} bricks, {} bytes)",
        doc.version,
        doc.home_base.bricks.len(),
        json.len()
    );
    Ok(json)
}

/// Validate the envelope and return the top-level object and its version
fn check_envelope(value: &Value) -> CoreResult<(&Map<String, Value>, u32)> {
    let obj = value
        .as_object()
        .ok_or_else(|| CoreError::InvalidFormat("save is not a JSON object".into()))?;
    let raw = obj
        .get("version")
        .ok_or_else(|| CoreError::InvalidFormat("save has no version".into()))?;
    let version = raw
        .as_u64()
        .ok_or_else(|| CoreError::InvalidFormat(format!("bad version field: {raw}")))?;
    let version = u32::try_from(version).map_err(|_| CoreError::UnsupportedVersion(u32::MAX))?;
    if version == 0 || version > SAVE_VERSION {
        return Err(CoreError::UnsupportedVersion(version));
    }
    Ok((obj, version))
}

/// Read an optional section, falling back to its default when absent or broken
fn section<T: DeserializeOwned + Default>(obj: Option<&Map<String, Value>>, key: &str) -> T {
    match obj.and_then(|o| o.get(key)) {
        None | Some(Value::Null) => T::default(),
        Some(v) => T::deserialize(v).unwrap_or_else(|e| {
            log::warn!("Resetting save section '{key}': {e}");
            T::default()
        }),
    }
}

/// Read a list, skipping entries that don't parse
fn records<T: DeserializeOwned>(obj: Option<&Map<String, Value>>, key: &str) -> Vec<T> {
    let Some(list) = obj.and_then(|o| o.get(key)).and_then(Value::as_array) else {
        return Vec::new();
    };
    list.iter()
        .enumerate()
        .filter_map(|(i, v)| match T::deserialize(v) {
            Ok(r) => Some(r),
            Err(e) => {
                log::warn!("Skipping {key}[{i}]: {e}");
                None
            }
        })
        .collect()
}

fn object<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    obj.get(key).and_then(Value::as_object)
}

/// Rebuild a game state from save JSON.
///
/// Fails with `InvalidFormat` or `UnsupportedVersion` before anything is built.
pub fn import_json(json: &str, settings: &Settings) -> CoreResult<GameState> {
    let value: Value = serde_json::from_str(json)?;
    let (obj, version) = check_envelope(&value)?;

    let mut state = GameState::new(settings.clone());

    state.progression = section(Some(obj), "progression");

    if let Some(resources) = object(obj, "resources") {
        for (key, amount) in resources {
            match (ResourceKind::from_str(key), amount.as_f64()) {
                (Some(kind), Some(amount)) => state.resources.set(kind, amount),
                _ => log::warn!("Skipping resource '{key}': {amount}"),
            }
        }
    }

    let inventory = object(obj, "inventory");
    let items: BTreeMap<String, u32> = section(inventory, "items");
    for (id, count) in &items {
        state.inventory.add_item(id, *count);
    }
    for item in records::<EquipmentRef>(inventory, "equipment") {
        match equipment::instantiate(&item.id, item.rarity) {
            Ok(e) => state.inventory.add_equipment(e),
            Err(e) => log::warn!("Dropping saved equipment: {e}"),
        }
    }
    let slots: BTreeMap<String, u32> = section(inventory, "unlockedSlots");
    for (ball, n) in &slots {
        match BallKind::from_str(ball) {
            Some(ball) => state.inventory.set_slots(ball, *n),
            None => log::warn!("Skipping slots for unknown ball '{ball}'"),
        }
    }
    let overlay_records: Vec<OverlayRecord> = records(inventory, "overlays");
    let legacy = LegacyOverlayIndex::load(&mut state.board, &overlay_records);
    if !legacy.is_empty() {
        log::debug!("Resolving {} version 1 overlay ids", legacy.len());
    }

    if let Some(enchantments) = object(obj, "enchantments") {
        for (key, ids) in enchantments {
            let Some(ball) = BallKind::from_str(key) else {
                log::warn!("Skipping enchantments for unknown ball '{key}'");
                continue;
            };
            let history: Vec<EnchantOutcome> = ids
                .as_array()
                .map(Vec::as_slice)
                .unwrap_or_default()
                .iter()
                .filter_map(|id| {
                    let outcome = id.as_str().and_then(EnchantOutcome::from_str);
                    if outcome.is_none() {
                        log::warn!("Skipping unknown enchant outcome {id} on {key}");
                    }
                    outcome
                })
                .collect();
            state
                .enchantments
                .replay(ball, &history, settings.enchant_replay_multiplier);
        }
    }

    let bricks: Vec<BrickRecord> = records(object(obj, "homeBase"), "bricks");
    restore_board(&mut state.board, &bricks, &legacy);

    // Capacities depend on the buildings just placed
    state.recompute_capacities();
    state.push_event(GameEvent::SaveLoaded);

    log::info!(
        "Imported save v{} ({} bricks, {} overlays)",
        version,
        state.board.brick_count(),
        state.board.overlays().len()
    );
    Ok(state)
}

/// Place saved bricks in order, skipping any that don't fit
fn restore_board(board: &mut Board, bricks: &[BrickRecord], legacy: &LegacyOverlayIndex) {
    for record in bricks {
        let placed = board
            .centered_to_grid(IVec2::new(record.c, record.r))
            .and_then(|anchor| board.place_brick(record.to_brick(), anchor));
        let id = match placed {
            Ok(id) => id,
            Err(e) => {
                log::warn!(
                    "Skipping saved {} brick at ({}, {}): {e}",
                    record.kind.as_str(),
                    record.c,
                    record.r
                );
                continue;
            }
        };

        let linked = match (&record.overlay_data, record.overlay_id) {
            (Some(data), stored) => {
                if stored.is_some() {
                    log::warn!(
                        "Brick at ({}, {}) has both overlayData and overlayId, using overlayData",
                        record.c,
                        record.r
                    );
                }
                let overlay = board.add_overlay(data.kind, data.level);
                board.attach_overlay(overlay, id)
            }
            (None, Some(stored)) => legacy.attach(board, stored, id),
            (None, None) => Ok(()),
        };
        if let Err(e) = linked {
            log::warn!("Brick at ({}, {}) keeps no overlay: {e}", record.c, record.r);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::OverlayId;
    use crate::equipment::Rarity;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn settings() -> Settings {
        Settings {
            rng_seed: Some(77),
            ..Default::default()
        }
    }

    fn sample_state() -> GameState {
        let mut state = GameState::new(settings());
        state.gain_xp(1_234);
        state.feed_goal(450);
        state.resources.set(ResourceKind::Food, 42.5);
        state.resources.set(ResourceKind::Aether, 3.0);
        state.resources.set(ResourceKind::Gems, 900.0);
        state.inventory.add_item("bomb", 4);
        state.inventory.unlock_slot(BallKind::Heavy);
        state
            .inventory
            .add_equipment(equipment::instantiate("splitter", Rarity::Rare).unwrap());

        let mut rng = Pcg32::seed_from_u64(5);
        for _ in 0..3 {
            state
                .enchantments
                .attempt(BallKind::Poison, 1e9, &mut rng)
                .unwrap();
        }

        let granary = state
            .place_brick(Brick::new(BrickKind::Granary, 2), IVec2::new(0, 0))
            .unwrap();
        let gold = state
            .place_brick(Brick::new(BrickKind::Gold, 3), IVec2::new(5, 5))
            .unwrap();
        state.hit_brick(gold, 4.0).unwrap();
        let spikes = state.board.add_overlay(OverlayKind::Spikes, 3);
        state.attach_overlay(spikes, granary).unwrap();
        state.board.add_overlay(OverlayKind::Mirror, 1);
        state
    }

    fn overlay_pairs(board: &Board) -> Vec<(IVec2, OverlayKind, u32)> {
        let mut pairs: Vec<_> = board
            .bricks()
            .filter_map(|b| board.overlay_on(b.id).map(|o| (b.anchor, o.kind, o.level)))
            .collect();
        pairs.sort_by_key(|(a, _, _)| (a.x, a.y));
        pairs
    }

    #[test]
    fn test_round_trip_preserves_persisted_fields() {
        let state = sample_state();
        let json = export_json(&state, 1_700_000_000_000).unwrap();
        let loaded = import_json(&json, &settings()).unwrap();

        assert_eq!(loaded.progression, state.progression);
        assert_eq!(loaded.player_level(), state.player_level());
        for kind in ResourceKind::ALL {
            assert_eq!(loaded.resources.amount(kind), state.resources.amount(kind));
        }
        assert_eq!(loaded.inventory, state.inventory);
        for ball in BallKind::ALL {
            let (a, b) = (state.enchantments.state(ball), loaded.enchantments.state(ball));
            assert_eq!(a.history, b.history);
            assert_eq!(a.level, b.level);
            assert_eq!(a.bonuses, b.bonuses);
        }

        let before: Vec<_> = state.board.bricks().cloned().collect();
        let after: Vec<_> = loaded.board.bricks().cloned().collect();
        assert_eq!(before.len(), after.len());
        for (a, b) in before.iter().zip(&after) {
            assert_eq!((a.kind, a.level, a.anchor, a.size), (b.kind, b.level, b.anchor, b.size));
            assert_eq!((a.health, a.coins, a.gems), (b.health, b.coins, b.gems));
        }
        assert_eq!(overlay_pairs(&loaded.board), overlay_pairs(&state.board));
        let detached: Vec<_> = loaded.board.overlays().unattached().map(|o| o.kind).collect();
        assert_eq!(detached, vec![OverlayKind::Mirror]);
        assert!(loaded.board.overlays().is_consistent());

        // Capacity is recomputed, not stored
        assert_eq!(loaded.resources.capacity(ResourceKind::Food), Some(200.0));
        assert!(!json.contains("capacity"));
    }

    #[test]
    fn test_export_is_stable() {
        let state = sample_state();
        let doc = export(&state, 5);
        let json = export_json(&state, 5).unwrap();
        let again = export(&import_json(&json, &settings()).unwrap(), 5);
        assert_eq!(doc, again);
    }

    #[test]
    fn test_export_shape() {
        let state = sample_state();
        let value: Value = serde_json::from_str(&export_json(&state, 9).unwrap()).unwrap();
        assert_eq!(value["version"], SAVE_VERSION);
        assert_eq!(value["timestamp"], 9);
        let bricks = value["homeBase"]["bricks"].as_array().unwrap();
        let granary = bricks.iter().find(|b| b["type"] == "granary").unwrap();
        // Anchor (0,0) on a 16x12 board is (-8,-6) from the center
        assert_eq!(granary["c"], -8);
        assert_eq!(granary["r"], -6);
        assert_eq!(granary["overlayData"]["type"], "spikes");
        assert!(granary.get("overlayId").is_none());
        assert_eq!(value["inventory"]["overlays"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_rejects_bad_envelopes() {
        let s = settings();
        assert!(matches!(import_json("[]", &s), Err(CoreError::InvalidFormat(_))));
        assert!(matches!(import_json("{}", &s), Err(CoreError::InvalidFormat(_))));
        assert!(matches!(
            import_json(r#"{"version": "2"}"#, &s),
            Err(CoreError::InvalidFormat(_))
        ));
        assert!(matches!(
            import_json(r#"{"version": 3}"#, &s),
            Err(CoreError::UnsupportedVersion(3))
        ));
        assert!(matches!(
            import_json(r#"{"version": 0}"#, &s),
            Err(CoreError::UnsupportedVersion(0))
        ));
        assert!(matches!(import_json("garbage", &s), Err(CoreError::InvalidFormat(_))));
    }

    #[test]
    fn test_minimal_document_uses_defaults() {
        let state = import_json(r#"{"version": 2}"#, &settings()).unwrap();
        assert_eq!(state.player_level().level, 1);
        assert_eq!(state.resources.amount(ResourceKind::Food), 0.0);
        assert_eq!(state.board.brick_count(), 0);
        assert_eq!(state.resources.capacity(ResourceKind::Food), Some(100.0));
    }

    #[test]
    fn test_broken_sections_fall_back() {
        let json = r#"{
            "version": 2,
            "progression": "lots",
            "resources": { "food": -20, "wood": 15, "unobtainium": 3, "stone": "x" },
            "inventory": {
                "items": 5,
                "equipment": [
                    { "id": "whetstone", "rarity": "epic" },
                    { "id": "nope", "rarity": "rare" },
                    7
                ]
            },
            "enchantments": { "heavy": ["damage", "bogus", "pierce"], "ghost": ["damage"] }
        }"#;
        let state = import_json(json, &settings()).unwrap();
        assert_eq!(state.progression, PlayerProgression::default());
        assert_eq!(state.resources.amount(ResourceKind::Food), 0.0);
        assert_eq!(state.resources.amount(ResourceKind::Wood), 15.0);
        assert_eq!(state.inventory.items().count(), 0);
        assert_eq!(state.inventory.owned_archetypes(), vec!["whetstone"]);
        let heavy = state.enchantments.state(BallKind::Heavy);
        assert_eq!(heavy.history, vec![EnchantOutcome::Damage, EnchantOutcome::Pierce]);
        assert_eq!(heavy.level, 3);
    }

    #[test]
    fn test_corrupt_bricks_skipped() {
        let json = r#"{
            "version": 2,
            "homeBase": { "bricks": [
                { "c": -8, "r": -6, "type": "normal", "width": 2, "height": 2 },
                { "c": -7, "r": -5, "type": "gold" },
                { "c": 20, "r": 20, "type": "gem" },
                { "c": 0, "r": 0, "type": "dragon" },
                {
                    "c": 0, "r": 0, "type": "warehouse", "level": 2,
                    "overlayData": { "type": "shield", "level": 2 }
                }
            ] }
        }"#;
        let state = import_json(json, &settings()).unwrap();
        assert_eq!(state.board.brick_count(), 2);
        let warehouse = state.board.brick_at(IVec2::new(8, 6)).unwrap();
        assert_eq!(warehouse.kind, BrickKind::Warehouse);
        assert_eq!(state.board.overlay_on(warehouse.id).unwrap().kind, OverlayKind::Shield);
        assert_eq!(state.resources.capacity(ResourceKind::Stone), Some(100.0));
    }

    #[test]
    fn test_unshiftable_coordinates_skipped() {
        let json = r#"{
            "version": 2,
            "homeBase": { "bricks": [
                { "c": 2147483647, "r": 0, "type": "normal" },
                { "c": 0, "r": -2147483648, "type": "normal" },
                { "c": 0, "r": 0, "type": "gold" }
            ] }
        }"#;
        let state = import_json(json, &settings()).unwrap();
        assert_eq!(state.board.brick_count(), 1);
        assert_eq!(state.board.brick_at(IVec2::new(8, 6)).unwrap().kind, BrickKind::Gold);
    }

    #[test]
    fn test_oversized_brick_skipped_and_capacity_untouched() {
        let json = r#"{
            "version": 2,
            "homeBase": { "bricks": [
                { "c": -8, "r": -6, "type": "granary", "level": 5, "width": 4000000000 },
                { "c": 0, "r": 0, "type": "lumberyard", "height": 4294967295 }
            ] }
        }"#;
        let state = import_json(json, &settings()).unwrap();
        assert_eq!(state.board.brick_count(), 0);
        assert_eq!(state.resources.capacity(ResourceKind::Food), Some(100.0));
        assert_eq!(state.resources.capacity(ResourceKind::Wood), Some(100.0));

        let reloaded = import_json(&export_json(&state, 0).unwrap(), &settings()).unwrap();
        assert_eq!(
            reloaded.resources.capacity(ResourceKind::Food),
            state.resources.capacity(ResourceKind::Food)
        );
    }

    #[test]
    fn test_brick_values_sanitised() {
        let json = r#"{
            "version": 2,
            "homeBase": { "bricks": [
                { "c": 0, "r": 0, "type": "normal", "health": 500, "maxHealth": 20, "coins": -4 }
            ] }
        }"#;
        let state = import_json(json, &settings()).unwrap();
        let brick = state.board.bricks().next().unwrap();
        assert_eq!(brick.max_health, 20.0);
        assert_eq!(brick.health, 20.0);
        assert_eq!(brick.coins, 0.0);
    }

    fn legacy_json(brick_extra: &str) -> String {
        format!(
            r#"{{
                "version": 1,
                "inventory": {{ "overlays": [
                    {{ "id": 11, "type": "bounty", "level": 2 }},
                    {{ "id": 12, "type": "regen", "level": 1 }}
                ] }},
                "homeBase": {{ "bricks": [
                    {{ "c": 1, "r": 1, "type": "armored"{brick_extra} }}
                ] }}
            }}"#
        )
    }

    #[test]
    fn test_legacy_overlay_ids_resolve() {
        let state = import_json(&legacy_json(r#", "overlayId": 11"#), &settings()).unwrap();
        let brick = state.board.brick_at(IVec2::new(9, 7)).unwrap();
        let overlay = state.board.overlay_on(brick.id).unwrap();
        assert_eq!((overlay.kind, overlay.level), (OverlayKind::Bounty, 2));
        assert_eq!(overlay.host(), Some(brick.id));
        let detached: Vec<_> = state.board.overlays().unattached().map(|o| o.kind).collect();
        assert_eq!(detached, vec![OverlayKind::Regen]);
        assert!(state.board.overlays().is_consistent());
    }

    #[test]
    fn test_legacy_and_embedded_paths_agree() {
        let legacy = import_json(&legacy_json(r#", "overlayId": 11"#), &settings()).unwrap();
        let embedded = import_json(&export_json(&legacy, 0).unwrap(), &settings()).unwrap();
        assert_eq!(overlay_pairs(&legacy.board), overlay_pairs(&embedded.board));
        assert_eq!(embedded.board.overlays().unattached().count(), 1);
    }

    #[test]
    fn test_embedded_overlay_wins_over_legacy_id() {
        let extra = r#", "overlayId": 11, "overlayData": { "type": "mirror", "level": 4 }"#;
        let state = import_json(&legacy_json(extra), &settings()).unwrap();
        let brick = state.board.brick_at(IVec2::new(9, 7)).unwrap();
        let overlay = state.board.overlay_on(brick.id).unwrap();
        assert_eq!((overlay.kind, overlay.level), (OverlayKind::Mirror, 4));
        assert_eq!(state.board.overlays().unattached().count(), 2);
    }

    #[test]
    fn test_unresolved_legacy_id_keeps_brick() {
        let state = import_json(&legacy_json(r#", "overlayId": 99"#), &settings()).unwrap();
        assert_eq!(state.board.brick_count(), 1);
        let brick_id = state.board.bricks().next().unwrap().id;
        assert!(state.board.overlay_on(brick_id).is_none());
        let unattached: Vec<OverlayId> =
            state.board.overlays().unattached().map(|o| o.id).collect();
        assert_eq!(unattached.len(), 2);
    }

    #[test]
    fn test_load_swaps_state_and_emits_event() {
        let source = sample_state();
        let json = source.to_save_json(1).unwrap();
        let mut target = GameState::new(settings());
        target.load_save_json(&json).unwrap();
        assert_eq!(target.progression, source.progression);
        assert_eq!(target.drain_events(), vec![GameEvent::SaveLoaded]);
    }
}
