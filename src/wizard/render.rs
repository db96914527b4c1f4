//! wizard::render
//!
//! Draws the current wizard step.

use ratatui::{prelude::*, widgets::Paragraph};

use super::input::TextInput;
use super::keys::hints;
use super::state::{ConfirmChoice, EditModel, SelectModel, Step, Wizard};
use crate::rebase::{find_squash_parent, RebaseOp};

const CURSOR: &str = "▏";

fn accent() -> Style {
    Style::default().fg(Color::Cyan).bold()
}

fn muted() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn warning() -> Style {
    Style::default().fg(Color::Yellow).bold()
}

/// Render the wizard into the whole frame.
pub fn draw(frame: &mut Frame, wizard: &Wizard) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Min(1),    // Body
            Constraint::Length(1), // Notice
            Constraint::Length(1), // Key hints
        ])
        .split(frame.area());

    let step = wizard.step();
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(" cw rebase ", accent()),
            Span::styled(title(step), Style::default().bold()),
        ])),
        layout[0],
    );

    let body_height = layout[1].height as usize;
    let body = match step {
        Step::SelectCommit(model) => select_lines(model, body_height),
        Step::PushWarning { edit, pushed } => push_warning_lines(edit, *pushed),
        Step::EditList(model) => edit_lines(model, body_height),
        Step::SquashMessage(model) => {
            let mut lines = vec![
                Line::styled("Message for the squashed commit:", accent()),
                Line::raw(""),
            ];
            lines.extend(input_lines(&model.input));
            lines
        }
        Step::Confirm { edit, choice } => confirm_lines(edit, *choice),
        Step::Done | Step::Cancelled => Vec::new(),
    };
    frame.render_widget(Paragraph::new(body), layout[1]);

    if let Some(notice) = wizard.notice() {
        frame.render_widget(
            Paragraph::new(Line::styled(format!(" {}", notice), warning())),
            layout[2],
        );
    }

    frame.render_widget(
        Paragraph::new(Line::styled(
            format!(" {}", hints(step.name(), wizard.input_mode())),
            muted(),
        )),
        layout[3],
    );
}

fn title(step: &Step) -> &'static str {
    match step {
        Step::SelectCommit(_) => "choose the commit to rebase onto",
        Step::PushWarning { .. } => "pushed commits",
        Step::EditList(_) => "edit history (oldest first)",
        Step::SquashMessage(_) => "squash message",
        Step::Confirm { .. } => "confirm",
        Step::Done => "done",
        Step::Cancelled => "cancelled",
    }
}

/// First row to show so that `cursor` stays visible.
fn scroll_offset(cursor: usize, height: usize) -> usize {
    if height == 0 {
        return cursor;
    }
    cursor.saturating_sub(height - 1)
}

fn select_lines(model: &SelectModel, height: usize) -> Vec<Line<'static>> {
    let offset = scroll_offset(model.cursor, height);
    (offset..model.row_count())
        .take(height)
        .map(|row| {
            let selected = row == model.cursor;
            let marker = if selected { "› " } else { "  " };
            let base = if selected { accent() } else { Style::default() };

            if model.is_root_row(row) {
                return Line::from(vec![
                    Span::styled(marker, base),
                    Span::styled("(root)", base.italic()),
                ]);
            }
            let commit = &model.commits[row];
            let mut spans = vec![
                Span::styled(marker, base),
                Span::styled(format!("{} ", commit.short_id), Style::default().fg(Color::Yellow)),
                Span::styled(commit.message.clone(), base),
                Span::styled(
                    format!("  {} · {}", commit.author, commit.timestamp.format("%Y-%m-%d")),
                    muted(),
                ),
            ];
            if commit.pushed {
                spans.push(Span::styled("  [pushed]", warning()));
            }
            Line::from(spans)
        })
        .collect()
}

fn push_warning_lines(edit: &EditModel, pushed: usize) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::styled(
            format!(
                "{} of {} commit(s) to rewrite are already on a remote.",
                pushed,
                edit.entries.len()
            ),
            warning(),
        ),
        Line::raw("Rewriting them will require a force push."),
        Line::raw(""),
    ];
    lines.extend(
        edit.entries
            .iter()
            .filter(|e| e.commit.pushed)
            .map(|e| Line::raw(format!("  {} {}", e.commit.short_id, e.commit.message))),
    );
    lines
}

fn op_style(op: RebaseOp) -> Style {
    match op {
        RebaseOp::Pick => Style::default().fg(Color::Green),
        RebaseOp::Squash => Style::default().fg(Color::Magenta),
        RebaseOp::Reword => Style::default().fg(Color::Blue),
        RebaseOp::Drop => Style::default().fg(Color::Red).crossed_out(),
    }
}

fn edit_lines(model: &EditModel, height: usize) -> Vec<Line<'static>> {
    let offset = scroll_offset(model.cursor, height);
    let mut lines = Vec::new();
    for (i, entry) in model.entries.iter().enumerate().skip(offset).take(height) {
        let selected = i == model.cursor;
        let indent = if entry.op == RebaseOp::Squash && find_squash_parent(&model.entries, i).is_some() {
            "    "
        } else {
            ""
        };
        let message = match (&model.editor, selected) {
            (Some(editor), true) => with_cursor(editor.value(), editor.cursor()),
            _ => entry.effective_message().lines().next().unwrap_or("").to_string(),
        };
        let mut spans = vec![
            Span::styled(if selected { "› " } else { "  " }, accent()),
            Span::raw(indent),
            Span::styled(format!("{:<6} ", entry.op.as_str()), op_style(entry.op).bold()),
            Span::styled(format!("{} ", entry.commit.short_id), Style::default().fg(Color::Yellow)),
            Span::styled(message, if selected { Style::default().bold() } else { Style::default() }),
        ];
        if entry.edited {
            spans.push(Span::styled(" *", muted()));
        }
        lines.push(Line::from(spans));
    }
    lines
}

fn confirm_lines(edit: &EditModel, choice: ConfirmChoice) -> Vec<Line<'static>> {
    let base = if edit.base_ref.is_empty() {
        "the root".to_string()
    } else {
        edit.base_ref.chars().take(7).collect()
    };
    let mut lines = vec![
        Line::raw(format!("Rebase {} commit(s) onto {}:", edit.entries.len(), base)),
        Line::raw(""),
    ];
    for entry in &edit.entries {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<6} ", entry.op.as_str()), op_style(entry.op)),
            Span::raw(format!(
                "{} {}",
                entry.commit.short_id,
                entry.effective_message().lines().next().unwrap_or("")
            )),
        ]));
    }
    lines.push(Line::raw(""));

    let mut buttons = vec![Span::raw("  ")];
    for option in ConfirmChoice::ALL {
        let style = if option == choice {
            Style::default().fg(Color::Black).bg(Color::Cyan).bold()
        } else {
            Style::default()
        };
        buttons.push(Span::styled(format!(" {} ", option.label()), style));
        buttons.push(Span::raw("  "));
    }
    lines.push(Line::from(buttons));
    lines
}

fn with_cursor(text: &str, cursor: usize) -> String {
    let mut out: String = text.chars().take(cursor).collect();
    out.push_str(CURSOR);
    out.extend(text.chars().skip(cursor));
    out
}

fn input_lines(input: &TextInput) -> Vec<Line<'static>> {
    with_cursor(input.value(), input.cursor())
        .split('\n')
        .map(|line| Line::raw(format!("  {}", line)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::RebaseCommit;
    use crate::git::GitError;
    use crate::rebase::test_support::commit;
    use crate::wizard::state::{Action, CommitSource};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    struct Three;

    impl CommitSource for Three {
        fn load_commits(&self, _limit: usize) -> Result<Vec<RebaseCommit>, GitError> {
            Ok(vec![commit("ccc", "third"), commit("bbb", "second"), commit("aaa", "first")])
        }
    }

    fn screen(wizard: &Wizard) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 12)).unwrap();
        terminal.draw(|frame| draw(frame, wizard)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn select_step_shows_root_row_when_exhausted() {
        let wizard = Wizard::new(&Three, false).unwrap();
        let text = screen(&wizard);
        assert!(text.contains("third"));
        assert!(text.contains("(root)"));
    }

    #[test]
    fn edit_step_indents_squash() {
        let mut wizard = Wizard::new(&Three, false).unwrap();
        for action in [Action::Down, Action::Down, Action::Select, Action::Down, Action::SetOp(RebaseOp::Squash)] {
            wizard.handle(action, &Three).unwrap();
        }
        let text = screen(&wizard);
        assert!(text.contains("    squash ccc"));
    }

    #[test]
    fn cursor_marker_is_inserted_at_char_position() {
        assert_eq!(with_cursor("héllo", 2), "hé▏llo");
        assert_eq!(with_cursor("", 0), "▏");
    }

    #[test]
    fn scroll_keeps_cursor_visible() {
        assert_eq!(scroll_offset(3, 10), 0);
        assert_eq!(scroll_offset(12, 10), 3);
    }
}
