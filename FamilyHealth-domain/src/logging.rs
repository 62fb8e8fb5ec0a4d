//! Best-effort sanitization of values before they reach the logs.
//!
//! Error strings coming back from the store can echo row contents. Before
//! logging them we strip control characters, mask e-mail addresses and long
//! digit runs, and cap the length.

/// Longest string written to the logs
pub const MAX_LOG_LENGTH: usize = 512;

/// Digit runs at least this long are masked
const MIN_MASKED_DIGITS: usize = 6;

/// Sanitize a string for logging
pub fn sanitize_for_log(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();

    let masked = mask_digit_runs(&mask_emails(&cleaned));

    if masked.chars().count() > MAX_LOG_LENGTH {
        let truncated: String = masked.chars().take(MAX_LOG_LENGTH).collect();
        format!("{}...", truncated)
    } else {
        masked
    }
}

fn mask_emails(input: &str) -> String {
    input
        .split(' ')
        .map(|word| {
            let trimmed = word.trim_matches(|c: char| !c.is_alphanumeric());
            match trimmed.split_once('@') {
                Some((local, domain)) if !local.is_empty() && domain.contains('.') => {
                    word.replace(trimmed, "[email]")
                },
                _ => word.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn mask_digit_runs(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut run = String::new();

    for c in input.chars() {
        if c.is_ascii_digit() {
            run.push(c);
            continue;
        }
        flush_run(&mut output, &mut run);
        output.push(c);
    }
    flush_run(&mut output, &mut run);

    output
}

fn flush_run(output: &mut String, run: &mut String) {
    if run.len() >= MIN_MASKED_DIGITS {
        output.push_str("[number]");
    } else {
        output.push_str(run);
    }
    run.clear();
}
