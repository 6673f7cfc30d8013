//! # Roll Module
//!
//! The archetype roll protocols and the session state they run against.
//!
//! A roll starts as a [`RollRequest`], runs as a [`RollSession`] owned by
//! exactly one protocol invocation, and finishes as a normalized
//! [`ItemData`] record. Each protocol is an ordered script of table
//! resolutions: every step loads a table through the environment's cache,
//! narrows it by the session's quality tier and condition tags, draws a
//! uniform roll from the environment's dice, and stores the resolved
//! outcome in one of the item's slots. Steps within one session never run
//! concurrently; the compound "roll twice" expansion in [`subprotocol`] is
//! the single designed concurrency point.

pub mod archetypes;
pub(crate) mod subprotocol;

pub use archetypes::*;

use crate::host::{
    CharacterSource, DiceRoller, ItemCatalog, OutcomePicker, ResourceStore, SpellSource,
};
use crate::item::{Archetype, Field, ItemData, LootItem};
use crate::tables::{
    filter_by_condition, filter_by_level, filter_by_quality, max_roll, resolve, QualityTier,
    TableCache,
};
use crate::{config, ForgeError, ForgeResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Tunables of the roll pipeline.
#[derive(Debug, Clone, Copy)]
pub struct RollConfig {
    /// Number of compound-reroll expansions allowed per resolution
    pub max_reroll_depth: usize,
}

impl Default for RollConfig {
    fn default() -> Self {
        Self {
            max_reroll_depth: config::MAX_REROLL_DEPTH,
        }
    }
}

/// Everything a roll needs from its host, bundled for sharing.
///
/// The trait objects are the seams described in [`crate::host`]; the cache
/// memoizes parsed tables across every roll made through this environment.
pub struct RollEnvironment {
    pub store: Arc<dyn ResourceStore>,
    pub dice: Arc<dyn DiceRoller>,
    pub character: Arc<dyn CharacterSource>,
    pub catalog: Arc<dyn ItemCatalog>,
    pub spells: Arc<dyn SpellSource>,
    pub picker: Arc<dyn OutcomePicker>,
    pub cache: TableCache,
    pub config: RollConfig,
}

impl RollEnvironment {
    pub fn new(
        store: Arc<dyn ResourceStore>,
        dice: Arc<dyn DiceRoller>,
        character: Arc<dyn CharacterSource>,
        catalog: Arc<dyn ItemCatalog>,
        spells: Arc<dyn SpellSource>,
        picker: Arc<dyn OutcomePicker>,
    ) -> Self {
        Self {
            store,
            dice,
            character,
            catalog,
            spells,
            picker,
            cache: TableCache::new(),
            config: RollConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RollConfig) -> Self {
        self.config = config;
        self
    }
}

/// One roll to perform: an archetype, an optional quality tier, and any
/// condition tags the host wants applied from the start.
#[derive(Debug, Clone, PartialEq)]
pub struct RollRequest {
    pub archetype: Archetype,
    pub quality: Option<QualityTier>,
    pub conditions: Vec<String>,
}

impl RollRequest {
    pub fn new(archetype: Archetype) -> Self {
        Self {
            archetype,
            quality: None,
            conditions: Vec::new(),
        }
    }

    pub fn with_quality(mut self, quality: QualityTier) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn with_condition(mut self, tag: impl Into<String>) -> Self {
        self.conditions.push(tag.into());
        self
    }
}

/// Per-resolution switches used by the sub-protocols.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct StepOptions {
    /// Drop the table's final row before rolling (the "skip-last" variant
    /// used to re-roll potency past the precious-material sentinel)
    pub skip_last: bool,
    /// Drop the compound-reroll sentinel row before rolling
    pub exclude_reroll_sentinel: bool,
}

/// State of one in-flight roll: the environment it draws on and the item
/// being populated. Owned by a single protocol invocation.
pub struct RollSession<'e> {
    env: &'e RollEnvironment,
    pub item: LootItem,
}

impl<'e> RollSession<'e> {
    /// Opens a session for a request, seeding quality and condition tags.
    pub fn new(env: &'e RollEnvironment, request: &RollRequest) -> Self {
        let mut item = LootItem::new(request.archetype);
        item.quality = request.quality;
        for tag in &request.conditions {
            item.add_condition(tag);
        }
        Self { env, item }
    }

    /// The environment this session draws tables, dice, and lookups from.
    pub fn env(&self) -> &RollEnvironment {
        self.env
    }

    /// Derives the table resource name for a field of this archetype
    /// (`"weapon/weapon-potency.tsv"` for `"potency"`).
    pub fn table_name(&self, field: &str) -> String {
        format!(
            "{prefix}/{prefix}-{field}.{ext}",
            prefix = self.item.prefix,
            field = field,
            ext = config::TABLE_EXTENSION
        )
    }

    /// Loads, filters, and resolves one table to an outcome label.
    ///
    /// This is the innermost step: it never expands the compound-reroll
    /// sentinel (that is [`subprotocol::resolve_with_reroll`]'s job), it
    /// just returns whatever label the roll lands on.
    pub(crate) async fn resolve_once(&self, table: &str, opts: StepOptions) -> ForgeResult<String> {
        let loaded = self.env.cache.load(self.env.store.as_ref(), table).await?;

        let rows = filter_by_quality(&loaded, self.item.quality)?;
        let rows = filter_by_level(
            rows,
            self.item.level.unwrap_or(config::DEFAULT_CHARACTER_LEVEL),
        );
        let mut rows = filter_by_condition(rows, &self.item.conditions);
        if opts.exclude_reroll_sentinel {
            rows.retain(|row| row.item() != Some(config::REROLL_SENTINEL));
        }
        if opts.skip_last {
            rows.pop();
        }
        if rows.is_empty() {
            return Err(ForgeError::Parse {
                name: table.to_string(),
                reason: "no rows remain after filtering".to_string(),
            });
        }

        let max = max_roll(&rows, table)?;
        let roll = self.env.dice.draw_uniform(max).await?;
        let row = resolve(&rows, roll, table)?;
        let outcome = row
            .item()
            .ok_or_else(|| ForgeError::Parse {
                name: table.to_string(),
                reason: format!("row matching roll {} has no item label", roll),
            })?
            .to_string();

        log::debug!(
            "[{}] {}: rolled {} of {} -> '{}'",
            self.item.id,
            table,
            roll,
            max,
            outcome
        );
        Ok(outcome)
    }

    /// Resolves a table to an outcome, expanding compound rerolls.
    pub async fn resolve_table(&self, table: &str) -> ForgeResult<String> {
        subprotocol::resolve_with_reroll(self, table, 0, StepOptions::default()).await
    }

    /// Resolves a field's table with explicit step options and stores the
    /// outcome in the item's slot.
    pub(crate) async fn roll_field_with(
        &mut self,
        field: Field,
        opts: StepOptions,
    ) -> ForgeResult<String> {
        let table = self.table_name(field.name());
        let outcome = subprotocol::resolve_with_reroll(self, &table, 0, opts)
            .await
            .map_err(|source| self.step_failure(field.name(), source))?;
        self.item.set_field(field, outcome.clone());
        log::debug!("[{}] {} <- '{}'", self.item.id, field, outcome);
        Ok(outcome)
    }

    /// Resolves a field's table and stores the outcome in the item's slot.
    pub async fn roll_field(&mut self, field: Field) -> ForgeResult<String> {
        self.roll_field_with(field, StepOptions::default()).await
    }

    /// Wraps a step error with the archetype and field being resolved.
    pub(crate) fn step_failure(&self, field: &str, source: ForgeError) -> ForgeError {
        ForgeError::RollFailure {
            archetype: self.item.archetype.to_string(),
            field: field.to_string(),
            source: Box::new(source),
        }
    }
}

/// One archetype's roll script.
///
/// `roll` populates the session's item through its table steps; `normalize`
/// turns the finished item into the host-facing record and only needs
/// overriding when an archetype augments the standard normalization.
#[async_trait]
pub trait RollProtocol: Send + Sync {
    fn archetype(&self) -> Archetype;

    async fn roll(&self, session: &mut RollSession<'_>) -> ForgeResult<()>;

    fn normalize(&self, item: &LootItem) -> ItemData {
        crate::item::to_item_data(item)
    }
}

/// Registry mapping archetypes to their protocols.
pub struct ArchetypeRegistry {
    protocols: HashMap<Archetype, Arc<dyn RollProtocol>>,
}

impl ArchetypeRegistry {
    /// An empty registry. Most callers want [`ArchetypeRegistry::standard`].
    pub fn new() -> Self {
        Self {
            protocols: HashMap::new(),
        }
    }

    /// The full stock registry, one protocol per archetype.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(WeaponProtocol));
        registry.register(Arc::new(ArmorProtocol));
        registry.register(Arc::new(ShieldProtocol));
        registry.register(Arc::new(StaffProtocol));
        registry.register(Arc::new(WandProtocol));
        registry.register(Arc::new(ScrollProtocol));
        registry.register(Arc::new(PotionProtocol));
        registry.register(Arc::new(WornProtocol));
        registry.register(Arc::new(JewelryProtocol));
        registry.register(Arc::new(GrimoireProtocol));
        registry
    }

    /// Registers a protocol under its own archetype, replacing any previous
    /// registration.
    pub fn register(&mut self, protocol: Arc<dyn RollProtocol>) {
        self.protocols.insert(protocol.archetype(), protocol);
    }

    /// Looks up the protocol for an archetype.
    pub fn get(&self, archetype: Archetype) -> Option<Arc<dyn RollProtocol>> {
        self.protocols.get(&archetype).cloned()
    }

    pub fn len(&self) -> usize {
        self.protocols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.protocols.is_empty()
    }

    /// Runs one roll end to end: protocol lookup, session, script,
    /// normalization.
    pub async fn roll(
        &self,
        env: &RollEnvironment,
        request: &RollRequest,
    ) -> ForgeResult<ItemData> {
        let protocol = self
            .get(request.archetype)
            .ok_or_else(|| ForgeError::UnknownArchetype(request.archetype.to_string()))?;

        let mut session = RollSession::new(env, request);
        match request.quality {
            Some(tier) => log::info!(
                "[{}] rolling {} at {} quality",
                session.item.id,
                request.archetype,
                tier
            ),
            None => log::info!("[{}] rolling {}", session.item.id, request.archetype),
        }

        protocol.roll(&mut session).await?;
        let data = protocol.normalize(&session.item);
        log::info!(
            "[{}] finished {}: '{}'",
            session.item.id,
            request.archetype,
            data.name
        );
        Ok(data)
    }
}

impl Default for ArchetypeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Rolls one archetype through a registry. The single entry point hosts
/// need when they are not composing registries themselves.
pub async fn roll_archetype(
    registry: &ArchetypeRegistry,
    env: &RollEnvironment,
    request: &RollRequest,
) -> ForgeResult<ItemData> {
    registry.roll(env, request).await
}
