/// Weekly activity summary: a fixed, locally seeded step series
use std::fmt::Write;

const BAR_WIDTH: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityPoint {
    pub label: &'static str,
    pub steps: u32,
}

/// Seven-day step counts shown once at startup; never fed by the channel
pub const WEEKLY_STEPS: [ActivityPoint; 7] = [
    ActivityPoint { label: "Mon", steps: 4000 },
    ActivityPoint { label: "Tue", steps: 5200 },
    ActivityPoint { label: "Wed", steps: 6000 },
    ActivityPoint { label: "Thu", steps: 4800 },
    ActivityPoint { label: "Fri", steps: 7000 },
    ActivityPoint { label: "Sat", steps: 3500 },
    ActivityPoint { label: "Sun", steps: 6200 },
];

/// Render a series as a horizontal bar chart scaled to the largest value
pub fn render_activity_chart(series: &[ActivityPoint]) -> String {
    let max = series.iter().map(|p| p.steps).max().unwrap_or(0);
    let mut out = String::from("Activity Summary (steps)\n");

    for point in series {
        let width = if max == 0 {
            0
        } else {
            (u64::from(point.steps) * u64::from(BAR_WIDTH) / u64::from(max)) as usize
        };
        let _ = writeln!(
            out,
            "  {:<3} {:<bar$} {}",
            point.label,
            "#".repeat(width),
            point.steps,
            bar = BAR_WIDTH as usize
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busiest_day_gets_full_bar() {
        let chart = render_activity_chart(&WEEKLY_STEPS);
        let fri = chart.lines().find(|l| l.trim_start().starts_with("Fri")).unwrap();
        assert!(fri.contains(&"#".repeat(BAR_WIDTH as usize)));
        assert!(fri.ends_with("7000"));
        assert_eq!(chart.lines().count(), 8);
    }

    #[test]
    fn empty_series_renders_header_only() {
        assert_eq!(render_activity_chart(&[]), "Activity Summary (steps)\n");
    }
}
