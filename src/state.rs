//! Live game state
//!
//! Everything the progression core mutates lives in one explicit struct.
//! UI and rendering layers read its fields and drain `GameEvent`s; gameplay
//! changes go through the named operations below.

use glam::IVec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::board::{Board, Brick, BrickId, OverlayId};
use crate::enchant::{BallKind, EnchantAttempt, EnchantOutcome, Enchantments};
use crate::equipment::{self, Equipment, Rarity};
use crate::error::{CoreError, CoreResult};
use crate::inventory::Inventory;
use crate::persistence;
use crate::progression::{LevelProgress, PlayerProgression};
use crate::resources::{ResourceKind, ResourcePool};
use crate::settings::Settings;

/// Notifications for the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    BrickSelected { brick: BrickId },
    BrickPlaced { brick: BrickId },
    BrickRemoved { brick: BrickId },
    BrickBroken { brick: BrickId, coins: f64, gems: f64 },
    LevelUp { level: u32 },
    GoalLevelUp { level: u32 },
    EquipmentFound { id: &'static str, rarity: Rarity },
    /// Every equipment archetype is owned
    CollectionComplete,
    EnchantResolved {
        ball: BallKind,
        success: bool,
        outcome: Option<EnchantOutcome>,
    },
    SaveLoaded,
}

/// Statistics for the current run (never saved)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    pub bricks_broken: u32,
    pub coins_earned: f64,
    pub gems_earned: f64,
    pub enchant_attempts: u32,
    pub equipment_found: u32,
}

/// Complete live state
#[derive(Debug, Clone)]
pub struct GameState {
    pub settings: Settings,
    pub progression: PlayerProgression,
    pub resources: ResourcePool,
    pub inventory: Inventory,
    pub enchantments: Enchantments,
    pub board: Board,
    /// Transient
    pub stats: RunStats,
    rng: Pcg32,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Fresh state for a new player
    pub fn new(settings: Settings) -> Self {
        let rng = match settings.rng_seed {
            Some(seed) => Pcg32::seed_from_u64(seed),
            None => Pcg32::from_rng(&mut rand::rng()),
        };
        let mut state = Self {
            progression: PlayerProgression::new(),
            resources: ResourcePool::new(),
            inventory: Inventory::new(),
            enchantments: Enchantments::new(),
            board: Board::new(settings.board_cols, settings.board_rows),
            stats: RunStats::default(),
            rng,
            events: Vec::new(),
            settings,
        };
        state.recompute_capacities();
        state
    }

    pub fn rng_mut(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn player_level(&self) -> LevelProgress {
        self.progression.level(self.settings.xp_base_amount)
    }

    pub fn goal_level(&self) -> LevelProgress {
        self.progression.goal_level()
    }

    /// Add player XP, emitting one event per level gained
    pub fn gain_xp(&mut self, amount: u64) {
        let before = self.player_level().level;
        let gained = self.progression.add_xp(amount, self.settings.xp_base_amount);
        for level in (before + 1)..=(before + gained) {
            log::info!("Player reached level {level}");
            self.events.push(GameEvent::LevelUp { level });
        }
    }

    /// Feed XP into the goal brick ladder
    pub fn feed_goal(&mut self, amount: u64) {
        let before = self.goal_level().level;
        let gained = self.progression.add_goal_xp(amount);
        for level in (before + 1)..=(before + gained) {
            self.events.push(GameEvent::GoalLevelUp { level });
        }
    }

    /// Roll a new piece of equipment the player doesn't own yet
    pub fn roll_equipment(&mut self) -> CoreResult<Option<Equipment>> {
        let owned = self.inventory.owned_archetypes();
        let drawn = equipment::draw_random(&mut self.rng, &owned, self.settings.better_luck)?;
        match &drawn {
            Some(item) => {
                self.inventory.add_equipment(item.clone());
                self.stats.equipment_found += 1;
                self.events.push(GameEvent::EquipmentFound {
                    id: item.id,
                    rarity: item.rarity,
                });
            }
            None => self.events.push(GameEvent::CollectionComplete),
        }
        Ok(drawn)
    }

    /// Enchant energy a batch of reagents would supply
    pub fn reagent_energy(reagents: &[(ResourceKind, f64)]) -> f64 {
        reagents
            .iter()
            .filter_map(|(kind, amount)| kind.energy_per_unit().map(|ep| ep * amount.max(0.0)))
            .sum()
    }

    /// Spend reagents and attempt an enchant in one step.
    ///
    /// Reagents are consumed whether or not the enchant succeeds. Non-reagent
    /// entries are ignored. Nothing is spent if the ball is maxed or the
    /// player can't pay.
    pub fn enchant(
        &mut self,
        ball: BallKind,
        reagents: &[(ResourceKind, f64)],
    ) -> CoreResult<EnchantAttempt> {
        if self.enchantments.state(ball).is_maxed() {
            return Err(CoreError::EnchantmentMaxed);
        }
        let costs: Vec<(ResourceKind, f64)> = reagents
            .iter()
            .copied()
            .filter(|(kind, _)| kind.energy_per_unit().is_some())
            .collect();
        self.resources.spend_all(&costs)?;

        let ep = Self::reagent_energy(&costs);
        let attempt = self.enchantments.attempt(ball, ep, &mut self.rng)?;
        self.stats.enchant_attempts += 1;
        self.events.push(GameEvent::EnchantResolved {
            ball,
            success: attempt.success,
            outcome: attempt.outcome,
        });
        Ok(attempt)
    }

    /// Place a brick on the home base
    pub fn place_brick(&mut self, brick: Brick, anchor: IVec2) -> CoreResult<BrickId> {
        let building = brick.is_building();
        let id = self.board.place_brick(brick, anchor)?;
        if building {
            self.recompute_capacities();
        }
        self.events.push(GameEvent::BrickPlaced { brick: id });
        Ok(id)
    }

    pub fn remove_brick(&mut self, id: BrickId) -> CoreResult<Brick> {
        let brick = self.board.remove_brick(id)?;
        if brick.is_building() {
            self.recompute_capacities();
        }
        self.events.push(GameEvent::BrickRemoved { brick: id });
        Ok(brick)
    }

    /// Damage a brick; a broken brick pays out and leaves the board.
    /// Returns true if the brick broke.
    pub fn hit_brick(&mut self, id: BrickId, damage: f64) -> CoreResult<bool> {
        let brick = self.board.brick_mut(id).ok_or(CoreError::UnknownBrick(id))?;
        if !brick.damage(damage) {
            return Ok(false);
        }
        let (coins, gems) = (brick.coins, brick.gems);
        self.remove_brick(id)?;
        self.resources.add(ResourceKind::Gems, gems);
        self.stats.bricks_broken += 1;
        self.stats.coins_earned += coins;
        self.stats.gems_earned += gems;
        self.events.push(GameEvent::BrickBroken {
            brick: id,
            coins,
            gems,
        });
        Ok(true)
    }

    /// Select whatever brick covers a cell
    pub fn select_cell(&mut self, cell: IVec2) -> Option<BrickId> {
        let id = self.board.brick_at(cell)?.id;
        self.events.push(GameEvent::BrickSelected { brick: id });
        Some(id)
    }

    pub fn attach_overlay(&mut self, overlay: OverlayId, brick: BrickId) -> CoreResult<()> {
        self.board.attach_overlay(overlay, brick)
    }

    pub fn detach_overlay(&mut self, overlay: OverlayId) -> CoreResult<()> {
        self.board.detach_overlay(overlay)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Replace the whole board (e.g. from a level editor)
    pub fn set_board(&mut self, board: Board) {
        self.board = board;
        self.recompute_capacities();
    }

    /// Rebuild storage ceilings from the buildings on the board
    pub fn recompute_capacities(&mut self) {
        let bonuses = self.board.storage_bonuses();
        self.resources.recompute_capacities(bonuses);
    }

    /// Serialize the persistent parts of this state
    pub fn to_save_json(&self, timestamp: u64) -> CoreResult<String> {
        persistence::export_json(self, timestamp)
    }

    /// Replace this state with a loaded save. On error nothing changes.
    pub fn load_save_json(&mut self, json: &str) -> CoreResult<()> {
        let mut loaded = persistence::import_json(json, &self.settings)?;
        loaded.rng = self.rng.clone();
        *self = loaded;
        Ok(())
    }
}
