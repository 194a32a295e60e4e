use owo_colors::OwoColorize;
use synopsis_core::{ExtractedText, SummaryResult};

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!("\n{} {} {}", "Synopsis".bold().bright_blue(), "v".dimmed(), VERSION.dimmed());
    eprintln!("{}", "Summarize web pages with a language model\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print an error message with the stage that failed
pub fn print_error(stage: &str, message: &str) {
    eprintln!("{} {} {}", "✗".red(), format!("[{}]", stage).bold().red(), message.bright_red());
}

/// Print a labelled value
pub fn print_field(label: &str, value: &str) {
    eprintln!("  {} {}", format!("{}:", label).dimmed(), value.bright_white());
}

/// Print extraction details
pub fn print_extraction_details(text: &ExtractedText) {
    print_field("Scope", &text.scope().to_string());
    print_field("Characters", &text.char_count().to_string());
    eprintln!();
}

/// Print summary details, warning when the advisory checks did not pass
pub fn print_summary_details(result: &SummaryResult) {
    eprintln!("\n{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Summary Details".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());
    print_field("Model", result.model.as_str());
    print_field("Attempts", &result.attempts.to_string());
    print_field("Input", &format!("{} chars", result.input_chars));
    print_field("Truncated", if result.truncated { "yes" } else { "no" });
    print_field("Sentences", &result.check.sentence_count.to_string());
    print_field("Characters", &result.check.char_count.to_string());
    eprintln!();

    if !result.check.sentences_in_range() {
        print_warning("Summary sentence count is outside the expected range");
    }
    if !result.check.length_in_range() {
        print_warning("Summary length is outside the expected range");
    }
}

/// Format file size for display
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
