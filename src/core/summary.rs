//! Session statistics and summary persistence

use chrono::Utc;

use crate::types::{ExerciseKind, RangeOfMotion, SessionSummary, Tempo, Thresholds};
use crate::Result;

/// Running statistics for the current set
#[derive(Debug, Clone, Default)]
pub struct SessionTracker {
    first_ms: Option<u64>,
    last_ms: Option<u64>,
    frames_processed: u64,
    frames_skipped: u64,
    form_total: u64,
    rom: Option<RangeOfMotion>,
    last_sample: Option<(u64, f64)>,
    velocity_total: f64,
    velocity_samples: u64,
    velocity_max: f64,
    rep_timestamps_ms: Vec<u64>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn touch(&mut self, timestamp_ms: u64) {
        self.first_ms.get_or_insert(timestamp_ms);
        self.last_ms = Some(timestamp_ms);
    }

    /// Frame with no person or no usable primary angle
    pub fn record_skipped(&mut self, timestamp_ms: u64) {
        self.touch(timestamp_ms);
        self.frames_skipped += 1;
    }

    pub fn record_frame(&mut self, timestamp_ms: u64, form_score: u8, smoothed: Option<f64>) {
        self.touch(timestamp_ms);
        self.frames_processed += 1;
        self.form_total += u64::from(form_score);

        let Some(angle) = smoothed else {
            return;
        };

        self.rom = Some(match self.rom {
            Some(rom) => RangeOfMotion {
                min: rom.min.min(angle),
                max: rom.max.max(angle),
            },
            None => RangeOfMotion { min: angle, max: angle },
        });

        if let Some((prev_ms, prev_angle)) = self.last_sample {
            let dt_ms = timestamp_ms.saturating_sub(prev_ms);
            if dt_ms > 0 {
                let velocity = (angle - prev_angle).abs() / (dt_ms as f64 / 1000.0);
                self.velocity_total += velocity;
                self.velocity_samples += 1;
                self.velocity_max = self.velocity_max.max(velocity);
            }
        }
        self.last_sample = Some((timestamp_ms, angle));
    }

    pub fn record_rep(&mut self, timestamp_ms: u64) {
        self.rep_timestamps_ms.push(timestamp_ms);
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn frames_skipped(&self) -> u64 {
        self.frames_skipped
    }

    pub fn summarize(
        &self,
        exercise: ExerciseKind,
        rep_count: u32,
        thresholds: Option<Thresholds>,
    ) -> SessionSummary {
        let created_at = Utc::now();
        let avg_velocity = if self.velocity_samples > 0 {
            self.velocity_total / self.velocity_samples as f64
        } else {
            0.0
        };
        let form_score_avg = (self.frames_processed > 0)
            .then(|| self.form_total as f64 / self.frames_processed as f64);

        SessionSummary {
            id: format!("summary_{}_{}", exercise.id(), created_at.format("%Y%m%dT%H%M%S%3f")),
            created_at,
            exercise_type: exercise,
            rep_count,
            rep_timestamps_ms: self.rep_timestamps_ms.clone(),
            form_score_avg,
            range_of_motion: self.rom,
            avg_velocity_deg_per_sec: avg_velocity,
            max_velocity_deg_per_sec: self.velocity_max,
            tempo: Tempo::from_velocity(avg_velocity),
            duration_ms: match (self.first_ms, self.last_ms) {
                (Some(first), Some(last)) => last.saturating_sub(first),
                _ => 0,
            },
            frames_processed: self.frames_processed,
            frames_skipped: self.frames_skipped,
            thresholds,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Save summary as pretty JSON into `dir`; returns the file path
pub fn save_summary(summary: &SessionSummary, dir: &str) -> Result<String> {
    let filename = format!("{}/{}.json", dir, summary.id);
    let json = serde_json::to_string_pretty(summary)?;

    std::fs::create_dir_all(dir)?;
    std::fs::write(&filename, json)?;

    Ok(filename)
}

/// Load summary from a JSON file
pub fn load_summary(path: &str) -> Result<SessionSummary> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}
