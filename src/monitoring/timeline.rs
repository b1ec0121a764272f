//! Execution Timeline
//!
//! Tracks when each step started and how it ended, for run reports and
//! Gantt charts.

use std::collections::HashMap;
use std::time::Instant;

/// Type of timeline event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    /// Step action was invoked
    Started,
    /// Step action reported success
    Completed,
    /// Step action reported failure
    Failed,
    /// Step action could not be invoked
    Errored,
}

impl EventType {
    fn is_end(self) -> bool {
        !matches!(self, EventType::Started)
    }
}

/// A single event in the execution timeline.
#[derive(Debug, Clone)]
pub struct TimelineEvent {
    pub step_id: String,
    pub event_type: EventType,
    pub timestamp: Instant,
}

/// Records step events of a workflow run.
#[derive(Debug, Clone)]
pub struct ExecutionTimeline {
    events: Vec<TimelineEvent>,
    start_time: Instant,
}

impl ExecutionTimeline {
    /// Creates a new timeline starting now.
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            start_time: Instant::now(),
        }
    }

    /// Records an event for a step, stamped now.
    pub fn add_event(&mut self, step_id: impl Into<String>, event_type: EventType) {
        self.add_event_at(step_id, event_type, Instant::now());
    }

    /// Records an event that happened at `timestamp`.
    ///
    /// Chains stamp their own events; the driver records them once the
    /// chain has been joined.
    pub fn add_event_at(
        &mut self,
        step_id: impl Into<String>,
        event_type: EventType,
        timestamp: Instant,
    ) {
        self.events.push(TimelineEvent {
            step_id: step_id.into(),
            event_type,
            timestamp,
        });
    }

    /// Returns all recorded events.
    pub fn events(&self) -> &[TimelineEvent] {
        &self.events
    }

    /// Offset (ms) of the latest recorded event.
    fn last_offset(&self) -> u128 {
        self.events
            .iter()
            .map(|e| e.timestamp.saturating_duration_since(self.start_time).as_millis())
            .max()
            .unwrap_or(0)
    }

    /// Start and end offsets (ms) of every step that finished, sorted by start.
    fn spans(&self) -> Vec<(String, u128, u128, EventType)> {
        let mut starts: HashMap<&str, u128> = HashMap::new();
        let mut spans = Vec::new();

        for event in &self.events {
            let offset = event
                .timestamp
                .saturating_duration_since(self.start_time)
                .as_millis();

            if event.event_type.is_end() {
                if let Some(start) = starts.get(event.step_id.as_str()) {
                    spans.push((event.step_id.clone(), *start, offset, event.event_type));
                }
            } else {
                starts.insert(event.step_id.as_str(), offset);
            }
        }

        spans.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        spans
    }

    /// Returns step durations in milliseconds.
    pub fn durations(&self) -> HashMap<String, u128> {
        self.spans()
            .into_iter()
            .map(|(step, start, end, _)| (step, end.saturating_sub(start)))
            .collect()
    }

    /// Generates an ASCII Gantt chart.
    ///
    /// Each finished step is a bar placed relative to the latest event, so
    /// the chart does not depend on when it is rendered.
    /// Failed steps are drawn with `x`, errored ones with `!`.
    pub fn gantt_chart(&self) -> String {
        let mut output = String::from("\nExecution Timeline:\n\n");

        let total_time = self.last_offset();
        if total_time == 0 {
            return output;
        }

        // Scale to 50 characters width
        let scale = 50.0 / total_time as f64;

        for (step_id, start, end, event_type) in self.spans() {
            let start_pos = (start as f64 * scale) as usize;
            let width = ((end.saturating_sub(start)) as f64 * scale).max(1.0) as usize;
            let fill = match event_type {
                EventType::Failed => "x",
                EventType::Errored => "!",
                _ => "#",
            };

            output.push_str(&format!(
                "{} |{}{}| ({} ms)\n",
                truncate(&step_id, 14),
                " ".repeat(start_pos),
                fill.repeat(width),
                end.saturating_sub(start)
            ));
        }

        output.push_str(&format!("\nTotal: {} ms\n", total_time));
        output
    }
}

impl Default for ExecutionTimeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Pads or truncates a string to exactly `max_len` characters.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        format!("{:width$}", s, width = max_len)
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn at(timeline: &ExecutionTimeline, ms: u64) -> Instant {
        timeline.start_time + Duration::from_millis(ms)
    }

    #[test]
    fn test_timeline_creation() {
        let timeline = ExecutionTimeline::new();
        assert!(timeline.events().is_empty());
    }

    #[test]
    fn test_durations_from_stamped_events() {
        let mut timeline = ExecutionTimeline::new();
        let (s1, e1) = (at(&timeline, 0), at(&timeline, 40));
        let (s2, e2) = (at(&timeline, 10), at(&timeline, 30));
        timeline.add_event_at("wait", EventType::Started, s1);
        timeline.add_event_at("updateGrant3", EventType::Started, s2);
        timeline.add_event_at("updateGrant3", EventType::Failed, e2);
        timeline.add_event_at("wait", EventType::Completed, e1);

        let durations = timeline.durations();
        assert_eq!(durations.get("wait"), Some(&40));
        assert_eq!(durations.get("updateGrant3"), Some(&20));
    }

    #[test]
    fn test_durations_ignore_unfinished_steps() {
        let mut timeline = ExecutionTimeline::new();
        timeline.add_event("step1", EventType::Started);

        assert!(timeline.durations().is_empty());
    }

    #[test]
    fn test_gantt_chart_marks_outcomes() {
        let mut timeline = ExecutionTimeline::new();
        let stamps: Vec<Instant> = [0, 20, 20, 40, 40, 60]
            .iter()
            .map(|ms| at(&timeline, *ms))
            .collect();
        timeline.add_event_at("ok", EventType::Started, stamps[0]);
        timeline.add_event_at("ok", EventType::Completed, stamps[1]);
        timeline.add_event_at("bad", EventType::Started, stamps[2]);
        timeline.add_event_at("bad", EventType::Failed, stamps[3]);
        timeline.add_event_at("broken", EventType::Started, stamps[4]);
        timeline.add_event_at("broken", EventType::Errored, stamps[5]);

        let chart = timeline.gantt_chart();
        assert!(chart.contains("ok"));
        assert!(chart.contains('#'));
        assert!(chart.contains('x'));
        assert!(chart.contains('!'));
        assert!(chart.contains("Total:"));
    }

    #[test]
    fn test_gantt_chart_scaled_to_last_event() {
        let mut timeline = ExecutionTimeline::new();
        let (start, end) = (at(&timeline, 0), at(&timeline, 100));
        timeline.add_event_at("wait", EventType::Started, start);
        timeline.add_event_at("wait", EventType::Completed, end);
        std::thread::sleep(Duration::from_millis(150));

        let chart = timeline.gantt_chart();
        assert!(chart.contains(&format!("|{}|", "#".repeat(50))));
        assert!(chart.contains("Total: 100 ms"));
    }

    #[test]
    fn test_gantt_chart_empty() {
        let timeline = ExecutionTimeline::new();
        assert!(timeline.gantt_chart().contains("Timeline"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("wait", 6), "wait  ");
        assert_eq!(truncate("sendEmailToEveryone", 8), "sendE...");
    }
}
