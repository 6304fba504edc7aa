/// Characters per "word" in WPM arithmetic.
const CHARS_PER_WORD: f64 = 5.0;

/// Advisory numbers shown while a round is running.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LiveMetrics {
    pub gross_wpm: f64,
    pub net_wpm: u32,
    pub accuracy: u32,
    pub errors: usize,
}

/// Authoritative numbers computed once, when the round completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FinalMetrics {
    pub duration_seconds: u64,
    pub gross_wpm: u32,
    pub net_wpm: u32,
    pub accuracy_percent: u32,
    pub correct_chars: usize,
    pub uncorrected_errors: usize,
}

/// Positions in the typed prefix that differ from the target.
pub fn mismatches(input: &[char], target: &[char]) -> usize {
    input
        .iter()
        .zip(target.iter())
        .filter(|(typed, expected)| typed != expected)
        .count()
}

pub fn correct_count(input: &[char], target: &[char]) -> usize {
    input
        .iter()
        .zip(target.iter())
        .filter(|(typed, expected)| typed == expected)
        .count()
}

pub fn live(input: &[char], target: &[char], elapsed_secs: u64) -> LiveMetrics {
    let n = input.len();
    let errors = mismatches(input, target);
    let accuracy = if n == 0 {
        100
    } else {
        (100.0 * (n - errors) as f64 / n as f64).round() as u32
    };

    if elapsed_secs == 0 {
        return LiveMetrics {
            gross_wpm: 0.0,
            net_wpm: 0,
            accuracy,
            errors,
        };
    }

    let minutes = elapsed_secs as f64 / 60.0;
    let gross_wpm = (n as f64 / CHARS_PER_WORD) / minutes;
    let net_wpm = (gross_wpm - errors as f64 / minutes).max(0.0).round() as u32;

    LiveMetrics {
        gross_wpm,
        net_wpm,
        accuracy,
        errors,
    }
}

/// Finalize a round. `elapsed_secs` is floored at one second so the rate
/// arithmetic never divides by zero.
pub fn finalize(input: &[char], target: &[char], elapsed_secs: u64) -> FinalMetrics {
    let duration_seconds = elapsed_secs.max(1);
    let minutes = duration_seconds as f64 / 60.0;

    let gross = ((input.len() as f64 / CHARS_PER_WORD) / minutes).round();
    let correct_chars = correct_count(input, target);
    let accuracy_percent = if target.is_empty() {
        100
    } else {
        (100.0 * correct_chars as f64 / target.len() as f64).round() as u32
    };
    let uncorrected_errors = target.len().saturating_sub(correct_chars);
    let net = (gross - uncorrected_errors as f64 / minutes).max(0.0).round();

    FinalMetrics {
        duration_seconds,
        gross_wpm: gross as u32,
        net_wpm: net as u32,
        accuracy_percent,
        correct_chars,
        uncorrected_errors,
    }
}

/// Incremental mean, rounded, as used by the rolling aggregates.
pub fn rolling_average(old_average: u32, old_count: u32, value: u32) -> u32 {
    let total = old_average as f64 * old_count as f64 + value as f64;
    (total / (old_count as f64 + 1.0)).round() as u32
}
