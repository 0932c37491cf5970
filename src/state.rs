use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use gradation::data::export::{self, format_retained};
use gradation::data::loader::load_file;
use gradation::data::model::GradationSheet;
use gradation::engine::error::Result as GradationResult;
use gradation::engine::{
    clamp, clamp_one, parse_number, parse_total_weight, FmCalculator, FmMode, GradationEngine,
    GradationError, MaterialKind, MaterialSpec, RandomCurveGenerator, TotalWeightManager,
};
use gradation::settings::Settings;

// ---------------------------------------------------------------------------
// Per-material session
// ---------------------------------------------------------------------------

/// Limits and current curve for one material tab.
#[derive(Debug, Clone)]
pub struct MaterialSession {
    pub spec: MaterialSpec,
    pub passing: Vec<f64>,
}

impl MaterialSession {
    fn new(kind: MaterialKind) -> Self {
        let spec = kind.spec();
        let passing = spec.midpoint_curve();
        Self { spec, passing }
    }
}

/// Message shown in the top bar.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Info(String),
    Error(String),
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Selected material tab.
    pub material: MaterialKind,

    /// One session per material, indexed by `MaterialKind as usize`.
    sessions: Vec<MaterialSession>,

    /// Session-wide total weight; `engine` holds a clone of the same handle.
    total_weight: TotalWeightManager,
    engine: GradationEngine,
    generator: RandomCurveGenerator,
    fm: FmCalculator,

    pub fm_mode: FmMode,

    /// Edit buffer for the total-weight field.
    pub weight_text: String,

    /// Edit buffers for the table's passing and weight-retained cells.
    pub passing_text: Vec<String>,
    pub retained_text: Vec<String>,

    /// Sieve index currently being dragged on the chart.
    pub drag_index: Option<usize>,

    pub status: Option<Status>,

    pub settings: Settings,
    settings_path: Option<PathBuf>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Settings::default(), None)
    }
}

impl AppState {
    /// Build the state from stored preferences. With `settings_path` set,
    /// preference changes are written back to it.
    pub fn new(settings: Settings, settings_path: Option<PathBuf>) -> Self {
        let total_weight = TotalWeightManager::new(settings.total_weight);
        let engine = GradationEngine::new(total_weight.clone());

        let mut state = Self {
            material: settings.material,
            sessions: MaterialKind::ALL.into_iter().map(MaterialSession::new).collect(),
            total_weight,
            engine,
            generator: RandomCurveGenerator::new(),
            fm: FmCalculator,
            fm_mode: settings.fm_mode,
            weight_text: String::new(),
            passing_text: Vec::new(),
            retained_text: Vec::new(),
            drag_index: None,
            status: None,
            settings,
            settings_path,
        };
        state.refresh_text();
        state
    }

    // -- read access --

    pub fn session(&self) -> &MaterialSession {
        &self.sessions[self.material as usize]
    }

    fn session_mut(&mut self) -> &mut MaterialSession {
        &mut self.sessions[self.material as usize]
    }

    pub fn spec(&self) -> &MaterialSpec {
        &self.session().spec
    }

    pub fn passing(&self) -> &[f64] {
        &self.session().passing
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight.get_total_weight()
    }

    /// Retained weight per sieve for the current curve and total weight.
    pub fn retained(&self) -> Vec<f64> {
        self.engine.passing_to_retained(self.passing())
    }

    pub fn retained_percent(&self) -> Vec<f64> {
        self.engine.retained_percent(self.passing())
    }

    /// Fineness modulus in the selected mode.
    pub fn fm(&self) -> f64 {
        self.fm.calculate(self.fm_mode, self.passing(), &self.retained())
    }

    /// Clipboard text for the weight-retained column.
    pub fn retained_clipboard_text(&self) -> String {
        format_retained(&self.retained())
    }

    /// Whether sieve `i` of the current curve lies outside its limits.
    pub fn out_of_limits(&self, i: usize) -> bool {
        let spec = self.spec();
        let p = self.passing()[i];
        p < spec.lower_limits()[i] || p > spec.upper_limits()[i]
    }

    // -- edits --

    /// Switch material tab; each material keeps its own curve.
    pub fn select_material(&mut self, kind: MaterialKind) {
        if self.material == kind {
            return;
        }
        log::info!("material -> {}", kind.key());
        self.material = kind;
        self.drag_index = None;
        self.status = None;
        self.refresh_text();
        self.settings.material = kind;
        self.persist_settings();
    }

    /// Commit the total-weight field buffer.
    pub fn commit_weight_text(&mut self) -> GradationResult<f64> {
        let text = std::mem::take(&mut self.weight_text);
        self.set_total_weight_text(&text)
    }

    /// Parse and apply a user-entered total weight.
    ///
    /// Non-numeric and non-positive input is rejected: the weight stays as
    /// it was and the field is reset to show it.
    pub fn set_total_weight_text(&mut self, text: &str) -> GradationResult<f64> {
        match parse_total_weight(text) {
            Ok(weight) => {
                if weight != self.total_weight() {
                    log::info!("total weight -> {weight}");
                    self.total_weight.set_total_weight(weight);
                    self.settings.total_weight = weight;
                    self.persist_settings();
                }
                self.status = None;
                self.refresh_text();
                Ok(weight)
            }
            Err(e) => self.reject(e),
        }
    }

    pub fn set_fm_mode(&mut self, mode: FmMode) {
        if self.fm_mode != mode {
            self.fm_mode = mode;
            self.settings.fm_mode = mode;
            self.persist_settings();
        }
    }

    /// Replace the current curve with a random one inside the limits.
    pub fn randomize(&mut self) -> GradationResult<()> {
        let spec = self.spec();
        match self
            .generator
            .generate(spec.lower_limits(), spec.upper_limits())
        {
            Ok(curve) => {
                log::info!("generated random {} curve", self.material.key());
                self.session_mut().passing = curve;
                self.status = None;
                self.refresh_text();
                Ok(())
            }
            Err(e) => self.reject(e),
        }
    }

    /// Chart drag: propose a value for sieve `index`, get back the stored one.
    pub fn drag_point(&mut self, index: usize, proposed: f64) -> GradationResult<f64> {
        let spec = self.spec();
        let accepted = clamp_one(index, proposed, spec.lower_limits(), spec.upper_limits())?;
        self.session_mut().passing[index] = accepted;
        self.refresh_text();
        Ok(accepted)
    }

    /// Table edit of a percent-passing cell; the value is clamped to the limits.
    pub fn edit_passing(&mut self, index: usize, text: &str) -> GradationResult<f64> {
        match parse_number(text).and_then(|v| self.drag_point(index, v)) {
            Ok(v) => {
                self.status = None;
                Ok(v)
            }
            Err(e) => self.reject(e),
        }
    }

    /// Table edit of a weight-retained cell.
    ///
    /// The other sieves keep their retained weights; the passing curve is
    /// rebuilt from the edited column and clamped into the limits.
    pub fn edit_retained(&mut self, index: usize, text: &str) -> GradationResult<()> {
        let result = parse_number(text).and_then(|v| {
            if v < 0.0 {
                return Err(GradationError::InvalidNumericInput {
                    input: text.trim().to_string(),
                });
            }
            let mut retained = self.retained();
            let len = retained.len();
            let slot = retained
                .get_mut(index)
                .ok_or(GradationError::IndexOutOfRange { index, len })?;
            *slot = v;

            let spec = self.spec();
            let rebuilt = self.engine.retained_to_passing(&retained);
            clamp(&rebuilt, spec.lower_limits(), spec.upper_limits())
        });

        match result {
            Ok(curve) => {
                self.session_mut().passing = curve;
                self.status = None;
                self.refresh_text();
                Ok(())
            }
            Err(e) => self.reject(e),
        }
    }

    /// Log a rejected edit, show it, and restore the edit buffers.
    fn reject<T>(&mut self, err: GradationError) -> GradationResult<T> {
        log::warn!("rejected edit: {err}");
        self.status = Some(Status::Error(err.to_string()));
        self.refresh_text();
        Err(err)
    }

    /// Rewrite every edit buffer from the current values.
    pub fn refresh_text(&mut self) {
        self.weight_text = format!("{}", self.total_weight());
        self.passing_text = self.passing().iter().map(|p| format!("{p:.1}")).collect();
        self.retained_text = self.retained().iter().map(|r| format!("{r:.2}")).collect();
    }

    // -- files --

    /// Load a gradation table from disk into the current material tab.
    pub fn open_file(&mut self, path: &Path) -> Result<()> {
        let sheet = load_file(path)?;
        log::info!("loaded {} sieves from {}", sheet.len(), path.display());
        self.apply_sheet(sheet)?;
        self.remember_file(path);
        Ok(())
    }

    /// Adopt an imported sheet: its curve, its total weight when present,
    /// and its limits when it carries them.
    pub fn apply_sheet(&mut self, sheet: GradationSheet) -> Result<()> {
        sheet.validate()?;

        let built_in = self.material.spec();
        let spec = match sheet.limits(&format!("{} (imported)", self.material)) {
            Some(spec) => {
                let spec = spec?;
                if spec.same_limits(&built_in) {
                    built_in
                } else {
                    spec
                }
            }
            None if sheet.len() == built_in.len() => built_in,
            None => bail!(
                "sheet has {} sieves but {} uses {}; add lower/upper columns",
                sheet.len(),
                self.material,
                built_in.len()
            ),
        };

        let Some(passing) = sheet.passing_curve(&self.engine) else {
            bail!("sheet has no passing or retained values");
        };

        // All checks passed; commit.
        if let Some(weight) = sheet.effective_total_weight() {
            self.total_weight.set_total_weight(weight);
            self.settings.total_weight = weight;
        }

        let outside = passing
            .iter()
            .zip(spec.lower_limits().iter().zip(spec.upper_limits()))
            .filter(|(p, (lo, hi))| p < lo || p > hi)
            .count();

        *self.session_mut() = MaterialSession { spec, passing };
        self.drag_index = None;
        self.status = Some(if outside > 0 {
            Status::Error(format!("{outside} sieve(s) outside the specification limits"))
        } else {
            Status::Info("loaded table".to_string())
        });
        self.refresh_text();
        Ok(())
    }

    /// Write the current table as CSV.
    pub fn export_csv(&mut self, path: &Path) -> Result<()> {
        export::write_csv(
            path,
            self.spec(),
            self.passing(),
            &self.retained(),
            self.total_weight(),
        )?;
        log::info!("exported {} table to {}", self.material.key(), path.display());
        self.status = Some(Status::Info(format!("exported {}", path.display())));
        self.remember_file(path);
        Ok(())
    }

    fn remember_file(&mut self, path: &Path) {
        self.settings.last_file = Some(path.to_path_buf());
        self.persist_settings();
    }

    fn persist_settings(&self) {
        if let Some(path) = &self.settings_path {
            if let Err(e) = self.settings.save(path) {
                log::error!("failed to save settings: {e:#}");
            }
        }
    }
}
