//! Plain-text rendering of a view snapshot

use logfilter_core::{AggregateState, FoldMark, ViewSnapshot};
use std::fmt::Write;

fn aggregate_label(state: AggregateState) -> &'static str {
    match state {
        AggregateState::Shown => "on",
        AggregateState::Hidden => "off",
        AggregateState::Disabled => "disabled",
    }
}

/// Render displayed rows (or all rows) followed by the button bar
pub(crate) fn render_text(snapshot: &ViewSnapshot, show_hidden: bool) -> String {
    let mut out = String::new();

    for entry in &snapshot.entries {
        if !entry.displayed && !show_hidden {
            continue;
        }
        let fold = match entry.fold {
            FoldMark::None => ' ',
            FoldMark::Expandable => '+',
            FoldMark::Collapsible => '-',
        };
        let hidden = if entry.displayed { ' ' } else { 'h' };
        let indent = "  ".repeat(entry.nest_level as usize);
        let _ = writeln!(
            out,
            "{hidden}{fold} {:>5} {:<6} {indent}{}",
            entry.index, entry.level, entry.pair
        );
    }

    let buttons = &snapshot.buttons;
    let _ = writeln!(
        out,
        "\n#SCENARIO={} #TEST={} #ALL={} ERROR={}",
        aggregate_label(buttons.scenario),
        aggregate_label(buttons.test),
        aggregate_label(buttons.all),
        if buttons.error_override { "on" } else { "off" },
    );
    for button in &buttons.pairs {
        let _ = writeln!(
            out,
            "  [{}] {}",
            if button.visible { 'x' } else { ' ' },
            button.label
        );
    }

    let depths: Vec<String> = snapshot
        .depth_buttons
        .iter()
        .enumerate()
        .map(|(level, on)| format!("{level}{}", if *on { "*" } else { "" }))
        .collect();
    let _ = writeln!(out, "depth: {}", depths.join(" "));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use logfilter_test_utils::{engine_for, sample_session};

    #[test]
    fn renders_rows_and_buttons() {
        let mut engine = engine_for(sample_session().build());
        engine.collapse(2).unwrap();
        let text = render_text(&engine.snapshot().unwrap(), false);

        assert!(text.contains("#SCENARIO=on #TEST=on #ALL=on ERROR=on"));
        assert!(text.contains("[x] [#T]:TAPI Jumps"));
        assert!(text.contains("depth: 0* 1* 2*"));
        assert!(!text.lines().any(|l| l.starts_with('h')));
        assert_eq!(text.lines().filter(|l| l.contains("sockapi_test:Self")).count(), 0);
    }

    #[test]
    fn show_hidden_marks_rows() {
        let mut engine = engine_for(sample_session().build());
        engine.collapse(2).unwrap();
        let text = render_text(&engine.snapshot().unwrap(), true);

        assert_eq!(text.lines().filter(|l| l.starts_with('h')).count(), 3);
        assert!(text.lines().any(|l| l.starts_with(" +")));
    }
}
