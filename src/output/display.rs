//! Display functions for command results

use super::formatters::{hooked_word, order_text, wrap_words};
use crate::commands::{BuildResult, CompileResult, LookupResult, QuizListing, SearchResult};
use colored::Colorize;

/// Print search results, one word per line with hooks
pub fn print_search_result(result: &SearchResult, show_probability: bool) {
    println!("\n{}", "─".repeat(60).cyan());
    println!(
        "{} {}",
        result.lexicon.bright_cyan().bold(),
        result.description.bright_yellow()
    );
    println!("{}", "─".repeat(60).cyan());

    let front_width = result
        .words
        .iter()
        .map(|w| w.front_hooks.len())
        .max()
        .unwrap_or(0);
    for line in &result.words {
        let mut text = hooked_word(&line.front_hooks, &line.word, &line.back_hooks, front_width);
        if !line.symbols.is_empty() {
            text.push_str(&format!("  {}", line.symbols.magenta()));
        }
        if show_probability && let Some(order) = line.probability {
            text.push_str(&format!("  #{}", order_text(order)));
        }
        println!("{text}");
    }

    println!();
    println!(
        "{} in {:.3}s",
        format!("{} words", result.words.len()).green().bold(),
        result.duration.as_secs_f64()
    );
}

/// Print everything known about a word
pub fn print_lookup_result(result: &LookupResult) {
    println!("\n{}", "═".repeat(60).cyan());
    println!(
        " {} {} ",
        result.word.bright_yellow().bold(),
        format!("({})", result.lexicon).bright_cyan()
    );
    println!("{}", "═".repeat(60).cyan());

    if result.acceptable {
        println!("\n   {}", "Acceptable".green().bold());
    } else {
        println!("\n   {}", "Not acceptable".red().bold());
    }
    println!("   Alphagram:    {}", result.alphagram);
    println!(
        "   Hooks:        {}",
        hooked_word(&result.front_hooks, &result.word, &result.back_hooks, 0).trim()
    );
    println!(
        "   Inner hooks:  {}{}",
        if result.is_front_hook { "front " } else { "" },
        if result.is_back_hook { "back" } else { "" }
    );
    if !result.symbols.is_empty() {
        println!("   Symbols:      {}", result.symbols.magenta());
    }
    println!("   Points:       {}", result.point_value);
    println!("   Anagrams:     {}", result.num_anagrams);
    if let Some(order) = result.probability {
        println!(
            "   Probability:  {} ({} blanks)",
            order_text(order).bright_yellow(),
            result.blanks
        );
    }
    if let Some(order) = result.playability_order {
        println!(
            "   Playability:  {} (value {})",
            order_text(order).bright_yellow(),
            result.playability
        );
    }
    if let Some(definition) = &result.definition {
        println!("\n   {definition}");
    }
}

/// Print the outcome of a side-store build
pub fn print_build_result(result: &BuildResult) {
    println!("\n{}", "═".repeat(60).cyan());
    println!(" {} ", "SIDE STORE BUILT".bright_cyan().bold());
    println!("{}", "═".repeat(60).cyan());
    println!("\n   Lexicon:      {}", result.lexicon.bright_yellow().bold());
    println!("   Words:        {}", result.words);
    println!("   With symbols: {}", result.symbols);
    println!("   Output:       {}", result.path.display());
    println!("   Time taken:   {:.2}s", result.duration.as_secs_f64());
}

pub fn print_compile_result(result: &CompileResult) {
    println!(
        "{} {} words, {} nodes -> {}",
        result.lexicon.bright_yellow().bold(),
        result.words,
        result.nodes,
        result.path.display()
    );
    println!("   Checksum: {}", result.checksum.dimmed());
}

/// Print quiz questions with their answers
pub fn print_quiz_listing(listing: &QuizListing) {
    println!("\n{}", "═".repeat(60).cyan());
    println!(
        " {} {} ",
        listing.quiz_type.as_str().bright_cyan().bold(),
        format!("({})", listing.lexicon).bright_yellow()
    );
    println!("{}", "═".repeat(60).cyan());
    println!(
        "\n   {} questions, order {:?}, seed {}",
        listing.total_questions, listing.order, listing.seed
    );

    for (i, question) in listing.questions.iter().enumerate() {
        println!(
            "\n{} {}  {}",
            format!("{:>4}.", i + 1).dimmed(),
            question.question.bright_yellow().bold(),
            format!("[{}]", question.answers.len()).dimmed()
        );
        for line in wrap_words(&question.answers, 60) {
            println!("      {line}");
        }
    }
}
