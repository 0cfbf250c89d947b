//! Energy-resolution analysis over many events.
//!
//! Each event contributes its summed ECal energy, treated as zero below the
//! noise threshold. HCal energy is carried for reporting but does not enter
//! the resolution. Totals inside the beam's energy window are histogrammed
//! and their spread gives the resolution `sigma / mean`.

use tracing::info;

use crate::error::AnalysisError;
use crate::math::TOLERANCE;
use crate::scoring::EventSummary;

/// ECal sums below this energy (MeV) count as noise.
pub const ECAL_NOISE_THRESHOLD: f64 = 0.183;

/// Default number of bins of an [`EnergyHistogram`].
pub const DEFAULT_BIN_COUNT: usize = 600;

const REFERENCE_TABLE: [(f64, f64); 14] = [
    (1.0, 100.0),
    (2.0, 100.0),
    (3.0, 150.0),
    (5.0, 200.0),
    (10.0, 400.0),
    (20.0, 700.0),
    (30.0, 1000.0),
    (40.0, 1500.0),
    (50.0, 2000.0),
    (60.0, 2500.0),
    (70.0, 3000.0),
    (80.0, 3500.0),
    (90.0, 4000.0),
    (100.0, 4500.0),
];

/// Upper edge of the deposited-energy range (MeV) for each beam energy (GeV).
#[derive(Debug, Clone, PartialEq)]
pub struct BeamEnergyTable {
    entries: Vec<(f64, f64)>,
}

impl Default for BeamEnergyTable {
    fn default() -> Self {
        Self {
            entries: REFERENCE_TABLE.to_vec(),
        }
    }
}

impl BeamEnergyTable {
    /// Creates a table from `(beam GeV, max MeV)` pairs.
    ///
    /// # Errors
    ///
    /// Returns an error if a maximum is not a positive finite number.
    pub fn new(entries: impl IntoIterator<Item = (f64, f64)>) -> Result<Self, AnalysisError> {
        let mut entries: Vec<(f64, f64)> = entries.into_iter().collect();
        if let Some((beam, max)) = entries
            .iter()
            .find(|(_, max)| !(max.is_finite() && *max > 0.0))
        {
            return Err(AnalysisError::InvalidHistogram(format!(
                "maximum energy {max} for beam {beam} GeV must be positive"
            )));
        }
        entries.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(Self { entries })
    }

    /// Maximum deposited energy expected for `beam_gev`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::UnknownBeamEnergy`] if the table has no entry
    /// for this beam energy.
    pub fn max_energy(&self, beam_gev: f64) -> Result<f64, AnalysisError> {
        self.entries
            .iter()
            .find(|(beam, _)| (beam - beam_gev).abs() <= TOLERANCE)
            .map(|(_, max)| *max)
            .ok_or(AnalysisError::UnknownBeamEnergy(beam_gev))
    }

    /// Energy window for `beam_gev`.
    ///
    /// # Errors
    ///
    /// Returns an error if the beam energy is not in the table.
    pub fn window(&self, beam_gev: f64) -> Result<EnergyWindow, AnalysisError> {
        Ok(EnergyWindow::below(self.max_energy(beam_gev)?))
    }
}

/// Half-open energy interval `[min, max)` in MeV.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyWindow {
    pub min: f64,
    pub max: f64,
}

impl EnergyWindow {
    /// The window `[max / 5, max)`.
    #[must_use]
    pub fn below(max: f64) -> Self {
        Self { min: max / 5.0, max }
    }

    #[must_use]
    pub fn contains(&self, energy: f64) -> bool {
        energy >= self.min && energy < self.max
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max - self.min
    }
}

/// Fixed-width histogram over an [`EnergyWindow`].
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyHistogram {
    window: EnergyWindow,
    counts: Vec<u64>,
    underflow: u64,
    overflow: u64,
}

impl EnergyHistogram {
    /// Creates an empty histogram with `bin_count` bins.
    ///
    /// # Errors
    ///
    /// Returns an error if `bin_count` is zero or the window is empty or not
    /// finite.
    pub fn new(window: EnergyWindow, bin_count: usize) -> Result<Self, AnalysisError> {
        if bin_count == 0 {
            return Err(AnalysisError::InvalidHistogram("no bins".into()));
        }
        if !(window.min.is_finite() && window.max.is_finite() && window.width() > 0.0) {
            return Err(AnalysisError::InvalidHistogram(format!(
                "empty range [{}, {})",
                window.min, window.max
            )));
        }
        Ok(Self {
            window,
            counts: vec![0; bin_count],
            underflow: 0,
            overflow: 0,
        })
    }

    /// Creates an empty histogram with [`DEFAULT_BIN_COUNT`] bins.
    ///
    /// # Errors
    ///
    /// Returns an error if the window is empty or not finite.
    pub fn with_default_bins(window: EnergyWindow) -> Result<Self, AnalysisError> {
        Self::new(window, DEFAULT_BIN_COUNT)
    }

    pub fn fill(&mut self, energy: f64) {
        if energy < self.window.min {
            self.underflow += 1;
        } else if energy >= self.window.max || energy.is_nan() {
            self.overflow += 1;
        } else {
            #[allow(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                clippy::cast_precision_loss
            )]
            let bin = ((energy - self.window.min) / self.bin_width()) as usize;
            let last = self.counts.len() - 1;
            self.counts[bin.min(last)] += 1;
        }
    }

    #[must_use]
    pub fn window(&self) -> EnergyWindow {
        self.window
    }

    #[must_use]
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn bin_width(&self) -> f64 {
        self.window.width() / self.counts.len() as f64
    }

    /// Centre of bin `bin`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn bin_center(&self, bin: usize) -> f64 {
        self.window.min + (bin as f64 + 0.5) * self.bin_width()
    }

    /// Entries inside the window.
    #[must_use]
    pub fn entries(&self) -> u64 {
        self.counts.iter().sum()
    }

    #[must_use]
    pub fn underflow(&self) -> u64 {
        self.underflow
    }

    #[must_use]
    pub fn overflow(&self) -> u64 {
        self.overflow
    }
}

/// Summed energy of one event in each section, in MeV.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventEnergy {
    pub ecal: f64,
    pub hcal: f64,
}

impl EventEnergy {
    /// Energy entering the resolution: the ECal sum, or zero below
    /// `noise_threshold`.
    #[must_use]
    pub fn total(&self, noise_threshold: f64) -> f64 {
        if self.ecal < noise_threshold {
            0.0
        } else {
            self.ecal
        }
    }

    /// Both sections after the ECal noise cut.
    #[must_use]
    pub fn combined(&self, noise_threshold: f64) -> f64 {
        self.total(noise_threshold) + self.hcal
    }
}

impl From<&EventSummary> for EventEnergy {
    fn from(summary: &EventSummary) -> Self {
        Self {
            ecal: summary.ecal_total,
            hcal: summary.hcal_total,
        }
    }
}

/// Resolution of the ECal energy over a set of events.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub mean: f64,
    pub sigma: f64,
    /// `sigma / mean`, or zero when the mean is zero.
    pub resolution: f64,
    /// Events that fell inside the window.
    pub events: usize,
    pub histogram: EnergyHistogram,
}

impl Resolution {
    /// Estimates the resolution from the events whose total lies in `window`.
    ///
    /// The mean and sample standard deviation of the in-window totals stand
    /// in for the parameters of a Gaussian fit.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::EmptyWindow`] if no event lands in the window,
    /// or an error if the window cannot be histogrammed.
    pub fn estimate(
        events: &[EventEnergy],
        window: EnergyWindow,
        noise_threshold: f64,
    ) -> Result<Self, AnalysisError> {
        let mut histogram = EnergyHistogram::with_default_bins(window)?;
        let mut selected = Vec::with_capacity(events.len());
        for event in events {
            let total = event.total(noise_threshold);
            histogram.fill(total);
            if window.contains(total) {
                selected.push(total);
            }
        }
        if selected.is_empty() {
            return Err(AnalysisError::EmptyWindow {
                min: window.min,
                max: window.max,
            });
        }

        #[allow(clippy::cast_precision_loss)]
        let n = selected.len() as f64;
        let mean = selected.iter().sum::<f64>() / n;
        let variance =
            selected.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0).max(1.0);
        let sigma = variance.sqrt();
        let resolution = if mean.abs() < f64::EPSILON {
            0.0
        } else {
            sigma / mean
        };

        info!(
            events = selected.len(),
            underflow = histogram.underflow(),
            overflow = histogram.overflow(),
            mean,
            sigma,
            resolution,
            "estimated energy resolution"
        );
        Ok(Self {
            mean,
            sigma,
            resolution,
            events: selected.len(),
            histogram,
        })
    }

    /// Looks up the window for `beam_gev` and estimates the resolution with
    /// the default ECal noise threshold.
    ///
    /// # Errors
    ///
    /// Returns an error if the beam energy is unknown or no event lands in
    /// its window.
    pub fn for_beam(
        events: &[EventEnergy],
        table: &BeamEnergyTable,
        beam_gev: f64,
    ) -> Result<Self, AnalysisError> {
        Self::estimate(events, table.window(beam_gev)?, ECAL_NOISE_THRESHOLD)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ecal_only(totals: &[f64]) -> Vec<EventEnergy> {
        totals
            .iter()
            .map(|&ecal| EventEnergy { ecal, hcal: 0.0 })
            .collect()
    }

    #[test]
    fn reference_table_lookup() {
        let table = BeamEnergyTable::default();
        assert_relative_eq!(table.max_energy(10.0).unwrap(), 400.0);
        assert_relative_eq!(table.max_energy(100.0).unwrap(), 4500.0);
        let window = table.window(50.0).unwrap();
        assert_relative_eq!(window.min, 400.0);
        assert_relative_eq!(window.max, 2000.0);
        assert!(matches!(
            table.max_energy(15.0),
            Err(AnalysisError::UnknownBeamEnergy(e)) if (e - 15.0).abs() < 1e-12
        ));
    }

    #[test]
    fn custom_table_rejects_bad_maxima() {
        assert!(BeamEnergyTable::new([(1.0, 50.0), (2.0, 0.0)]).is_err());
        let table = BeamEnergyTable::new([(8.0, 320.0), (4.0, 160.0)]).unwrap();
        assert_relative_eq!(table.max_energy(4.0).unwrap(), 160.0);
    }

    #[test]
    fn histogram_binning() {
        let mut histogram = EnergyHistogram::new(EnergyWindow::below(100.0), 8).unwrap();
        assert_relative_eq!(histogram.bin_width(), 10.0);
        assert_relative_eq!(histogram.bin_center(0), 25.0);
        for energy in [10.0, 20.0, 25.0, 29.999, 99.999, 100.0, f64::NAN] {
            histogram.fill(energy);
        }
        assert_eq!(histogram.underflow(), 1);
        assert_eq!(histogram.overflow(), 2);
        assert_eq!(histogram.counts()[0], 3);
        assert_eq!(histogram.counts()[7], 1);
        assert_eq!(histogram.entries(), 4);
    }

    #[test]
    fn histogram_rejects_degenerate_ranges() {
        assert!(EnergyHistogram::new(EnergyWindow::below(100.0), 0).is_err());
        assert!(EnergyHistogram::with_default_bins(EnergyWindow::below(0.0)).is_err());
        let histogram = EnergyHistogram::with_default_bins(EnergyWindow::below(400.0)).unwrap();
        assert_eq!(histogram.counts().len(), 600);
    }

    #[test]
    fn noise_threshold_drops_small_ecal_sums() {
        let quiet = EventEnergy {
            ecal: 0.18,
            hcal: 300.0,
        };
        let loud = EventEnergy {
            ecal: 0.2,
            hcal: 300.0,
        };
        assert_relative_eq!(quiet.total(ECAL_NOISE_THRESHOLD), 0.0);
        assert_relative_eq!(loud.total(ECAL_NOISE_THRESHOLD), 0.2);
        assert_relative_eq!(quiet.combined(ECAL_NOISE_THRESHOLD), 300.0);
        assert_relative_eq!(loud.combined(ECAL_NOISE_THRESHOLD), 300.2);
    }

    #[test]
    fn hcal_energy_does_not_move_the_total() {
        let event = EventEnergy {
            ecal: 200.0,
            hcal: 500.0,
        };
        assert_relative_eq!(event.total(ECAL_NOISE_THRESHOLD), 200.0);

        // the same ECal sums give the same resolution whatever the HCal saw
        let quiet = ecal_only(&[190.0, 200.0, 210.0]);
        let busy: Vec<EventEnergy> = quiet
            .iter()
            .zip([500.0, 0.0, 1500.0])
            .map(|(e, hcal)| EventEnergy { hcal, ..*e })
            .collect();
        let table = BeamEnergyTable::default();
        let a = Resolution::for_beam(&quiet, &table, 10.0).unwrap();
        let b = Resolution::for_beam(&busy, &table, 10.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn resolution_from_in_window_events() {
        // 50 and 5000 fall outside [80, 400); HCal energy is ignored
        let events: Vec<EventEnergy> = [50.0, 190.0, 200.0, 210.0, 5000.0]
            .iter()
            .map(|&ecal| EventEnergy { ecal, hcal: 250.0 })
            .collect();
        let resolution = Resolution::for_beam(&events, &BeamEnergyTable::default(), 10.0).unwrap();
        assert_eq!(resolution.events, 3);
        assert_relative_eq!(resolution.mean, 200.0, epsilon = 1e-9);
        assert_relative_eq!(resolution.sigma, 10.0, epsilon = 1e-9);
        assert_relative_eq!(resolution.resolution, 0.05, epsilon = 1e-12);
        assert_eq!(resolution.histogram.underflow(), 1);
        assert_eq!(resolution.histogram.overflow(), 1);
        assert_eq!(resolution.histogram.entries(), 3);
    }

    #[test]
    fn single_event_has_zero_spread() {
        let events = ecal_only(&[150.0]);
        let resolution =
            Resolution::estimate(&events, EnergyWindow::below(400.0), ECAL_NOISE_THRESHOLD)
                .unwrap();
        assert_relative_eq!(resolution.sigma, 0.0);
        assert_relative_eq!(resolution.resolution, 0.0);
    }

    #[test]
    fn zero_mean_gives_zero_resolution() {
        let events = ecal_only(&[0.0, 0.0]);
        let window = EnergyWindow { min: 0.0, max: 1.0 };
        let resolution = Resolution::estimate(&events, window, ECAL_NOISE_THRESHOLD).unwrap();
        assert_relative_eq!(resolution.resolution, 0.0);
    }

    #[test]
    fn empty_window_is_an_error() {
        let events = ecal_only(&[1.0, 2.0]);
        let err = Resolution::for_beam(&events, &BeamEnergyTable::default(), 1.0).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyWindow { .. }));
    }

    #[test]
    fn summaries_feed_the_analysis() {
        let summary = EventSummary {
            ecal_total: 212.0,
            hcal_total: 188.0,
            towers: Vec::new(),
            blocks: Vec::new(),
        };
        let energy = EventEnergy::from(&summary);
        assert_relative_eq!(energy.total(ECAL_NOISE_THRESHOLD), 212.0);
        assert_relative_eq!(energy.combined(ECAL_NOISE_THRESHOLD), 400.0);
    }
}
