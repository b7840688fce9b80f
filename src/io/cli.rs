//! Command-line interface for replaying scenarios and fuzzing the partition

use crate::host::interface::{ItemKind, SurfaceId};
use crate::host::sandbox::Sandbox;
use crate::io::configuration::{DEFAULT_FUZZ_RADIUS, DEFAULT_SEED, Settings};
use crate::io::diagnostics::{SurfaceReport, TagOverlay};
use crate::io::error::{Result, StorageError, invalid_parameter, partition_violation};
use crate::io::image::export_overlay_png;
use crate::io::persistence::{load_store, save_store};
use crate::io::progress::StepProgress;
use crate::io::scenario::{EventOutcome, apply_event, load_scenario};
use crate::spatial::key::TilePos;
use crate::storage::store::Store;
use crate::tick::engine::TickReport;
use clap::{ArgAction, Parser};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::io::Write;
use std::path::PathBuf;

// Surface the fuzzer edits
const FUZZ_SURFACE: SurfaceId = SurfaceId(0);
// Items the fuzzer adds per stocking step
const FUZZ_STOCK: u32 = 10;

fn stock_patch(store: &mut Store, pos: TilePos, kind: &ItemKind) -> u32 {
    let Some(surface) = store.surface_mut(FUZZ_SURFACE) else {
        return 0;
    };
    let Some(id) = surface.patch_id_at(pos) else {
        return 0;
    };
    surface
        .patch_mut(id)
        .map_or(0, |patch| patch.inventory_mut().add(kind, FUZZ_STOCK))
}

#[derive(Parser, Debug)]
#[command(name = "patchstore")]
#[command(
    author,
    version,
    about = "Replay storage scenarios and fuzz the tile partition"
)]
/// Command-line arguments for the scenario runner
pub struct Cli {
    /// Scenario JSON file to replay
    #[arg(value_name = "SCENARIO")]
    pub scenario: Option<PathBuf>,

    /// Items each storage tile adds to its patch capacity
    #[arg(long)]
    pub tile_capacity: Option<u32>,

    /// Ticks between scanner refreshes
    #[arg(long)]
    pub scanner_period: Option<u32>,

    /// Extra ticks to run after the scenario
    #[arg(short, long, default_value_t = 0)]
    pub ticks: u32,

    /// Random place/remove steps to run, checking the partition after each
    #[arg(short, long, value_name = "STEPS")]
    pub fuzz: Option<usize>,

    /// Random seed for reproducible fuzzing
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Half-width of the square area the fuzzer edits
    #[arg(short, long, default_value_t = DEFAULT_FUZZ_RADIUS)]
    pub radius: i32,

    /// Write a PNG overlay of the first surface's patches
    #[arg(short, long, value_name = "PNG")]
    pub overlay: Option<PathBuf>,

    /// Save a snapshot of the final state
    #[arg(long, value_name = "JSON")]
    pub save: Option<PathBuf>,

    /// Start from a saved snapshot instead of an empty store
    #[arg(long, value_name = "JSON")]
    pub load: Option<PathBuf>,

    /// Print the patch id of every tile
    #[arg(long)]
    pub tags: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase log verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Default log filter for the verbosity level
    pub const fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Apply command-line overrides to a set of settings
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting settings are invalid
    pub fn settings(&self, base: Settings) -> Result<Settings> {
        let mut settings = base;
        if let Some(capacity) = self.tile_capacity {
            settings.tile_capacity = capacity;
        }
        if let Some(period) = self.scanner_period {
            settings.scanner_update_period = period;
        }
        settings.validate()?;
        Ok(settings)
    }
}

/// Drives one run: load, replay, tick, fuzz, then write outputs
pub struct ScenarioRunner {
    cli: Cli,
    store: Store,
    sandbox: Sandbox,
}

impl ScenarioRunner {
    /// Create a runner with an empty store
    pub fn new(cli: Cli) -> Self {
        Self {
            cli,
            store: Store::default(),
            sandbox: Sandbox::new(),
        }
    }

    /// Final store state
    pub const fn store(&self) -> &Store {
        &self.store
    }

    /// Final sandbox state
    pub const fn sandbox(&self) -> &Sandbox {
        &self.sandbox
    }

    /// Run every stage requested on the command line, writing reports to `out`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A scenario or snapshot file cannot be read or decoded
    /// - A scenario event is invalid
    /// - The fuzzer finds a broken partition or lost items
    /// - An output file cannot be written
    pub fn run(&mut self, out: &mut impl Write) -> Result<()> {
        if let Some(path) = &self.cli.load {
            self.store = load_store(path)?;
            self.sandbox = Sandbox::mirror(&self.store);
        }

        let scenario = self.cli.scenario.as_deref().map(load_scenario).transpose()?;
        let base = match (&scenario, &self.cli.load) {
            (Some(scenario), None) => scenario.settings.unwrap_or_default(),
            _ => self.store.settings(),
        };
        self.store.set_settings(self.cli.settings(base)?)?;

        if let Some(scenario) = scenario {
            let progress = StepProgress::new(
                "events",
                scenario.events.len() as u64,
                self.cli.should_show_progress(),
            );
            for event in &scenario.events {
                let outcome = apply_event(&mut self.store, &mut self.sandbox, event)?;
                Self::write_outcome(out, &outcome)?;
                progress.step(event.label());
            }
            progress.finish();
        }

        if self.cli.ticks > 0 {
            let report = self.run_ticks(self.cli.ticks);
            Self::write_outcome(out, &EventOutcome::Ticked(report))?;
        }

        if let Some(steps) = self.cli.fuzz {
            self.fuzz(steps, out)?;
        }

        self.write_outputs(out)
    }

    fn run_ticks(&mut self, count: u32) -> TickReport {
        let progress =
            StepProgress::new("ticks", u64::from(count), self.cli.should_show_progress());
        let mut report = TickReport::default();
        for tick in 0..count {
            report.absorb(self.store.tick(&mut self.sandbox));
            if tick % 64 == 0 {
                progress.step(format!("+{} -{}", report.items_in, report.items_out));
            } else {
                progress.step(String::new());
            }
        }
        progress.finish();
        report
    }

    /// Random brush edits around the origin of the fuzz surface
    ///
    /// Every step places, mines or stocks tiles, then checks the partition
    /// against the sandbox and that no stored item was created or lost.
    fn fuzz(&mut self, steps: usize, out: &mut impl Write) -> Result<()> {
        if self.cli.radius <= 0 {
            return Err(invalid_parameter(
                "radius",
                &self.cli.radius,
                &"must be positive",
            ));
        }
        let radius = self.cli.radius;
        let mut rng = StdRng::seed_from_u64(self.cli.seed);
        let progress = StepProgress::new("fuzz", steps as u64, self.cli.should_show_progress());
        let kind = ItemKind::new("fuzz-item");
        let mut expected_items = self
            .store
            .surface(FUZZ_SURFACE)
            .map_or(0, |surface| surface.item_count());
        let mut refusals = 0usize;

        for _ in 0..steps {
            let center = TilePos::new(
                rng.random_range(-radius..=radius),
                rng.random_range(-radius..=radius),
            );
            let brush: Vec<TilePos> = (0..rng.random_range(1..=3))
                .map(|_| center.offset(rng.random_range(-1..=1), rng.random_range(-1..=1)))
                .collect();

            let roll: f64 = rng.random();
            if roll < 0.5 {
                for &pos in &brush {
                    self.sandbox.set_tile(FUZZ_SURFACE, pos);
                }
                self.store
                    .on_tiles_built(&self.sandbox, FUZZ_SURFACE, &brush)?;
            } else if roll < 0.85 {
                for &pos in &brush {
                    self.sandbox.clear_tile(FUZZ_SURFACE, pos);
                }
                let refused = self
                    .store
                    .on_tiles_mined(&self.sandbox, FUZZ_SURFACE, &brush)?;
                for &pos in &refused {
                    self.sandbox.set_tile(FUZZ_SURFACE, pos);
                }
                refusals += refused.len();
            } else {
                expected_items += u64::from(stock_patch(&mut self.store, center, &kind));
            }

            if let Some(surface) = self.store.surface(FUZZ_SURFACE) {
                surface.check_partition(&self.sandbox)?;
                if surface.item_count() != expected_items {
                    return Err(partition_violation(
                        FUZZ_SURFACE,
                        &format!(
                            "fuzz expected {expected_items} items but patches hold {}",
                            surface.item_count()
                        ),
                    ));
                }
            }
            progress.step(String::new());
        }
        progress.finish();

        let patches = self
            .store
            .surface(FUZZ_SURFACE)
            .map_or(0, |surface| surface.patch_count());
        writeln!(
            out,
            "fuzz: {steps} steps, seed {}, {patches} patches, {refusals} refused removals",
            self.cli.seed
        )?;
        Ok(())
    }

    fn write_outcome(out: &mut impl Write, outcome: &EventOutcome) -> Result<()> {
        match outcome {
            EventOutcome::Applied => {}
            EventOutcome::Refused(positions) => {
                let listed: Vec<String> = positions.iter().map(ToString::to_string).collect();
                writeln!(out, "refused removal of {}", listed.join(" "))?;
            }
            EventOutcome::Ticked(report) => {
                writeln!(
                    out,
                    "ticks: {} items in, {} items out, {} stale connectors pruned",
                    report.items_in, report.items_out, report.pruned
                )?;
            }
            EventOutcome::Reported(reports) => {
                for report in reports {
                    write!(out, "{report}")?;
                }
            }
        }
        Ok(())
    }

    fn write_outputs(&self, out: &mut impl Write) -> Result<()> {
        let tile_capacity = self.store.settings().tile_capacity;
        for surface in self.store.surfaces() {
            write!(out, "{}", SurfaceReport::of(surface, tile_capacity))?;
        }

        if self.cli.tags {
            let overlay = TagOverlay::new(true);
            for surface in self.store.surfaces() {
                for tag in overlay.labels(surface) {
                    writeln!(out, "{} {}", tag.position, tag.text)?;
                }
            }
        }

        if let Some(path) = &self.cli.overlay {
            let surface = self
                .store
                .surfaces()
                .next()
                .ok_or(StorageError::NothingToRender {
                    surface: FUZZ_SURFACE,
                })?;
            export_overlay_png(surface, path)?;
        }

        if let Some(path) = &self.cli.save {
            save_store(&self.store, path)?;
        }
        Ok(())
    }
}
