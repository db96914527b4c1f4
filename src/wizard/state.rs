//! wizard::state
//!
//! The history wizard as a pure state machine.
//!
//! # Steps
//!
//! ```text
//! SelectCommit ─┬─> PushWarning ─┐
//!               └────────────────┴─> EditList ─┬─> SquashMessage ─┐
//!                                              └──────────────────┴─> Confirm ─> Done
//! ```
//!
//! Any step can end in `Cancelled`. Each step owns its sub-model; a
//! transition moves the sub-model into the next step by value.
//!
//! The machine never touches the terminal. It consumes [`Action`]s and reads
//! history through a [`CommitSource`], so it can be driven directly in tests.

use crate::core::types::RebaseCommit;
use crate::git::{Git, GitError};
use crate::rebase::driver::check_entries;
use crate::rebase::{
    combined_squash_message, count_pushed, entries_after, squash_parents_needing_message,
    RebaseEntry, RebaseOp,
};

use super::input::TextInput;

/// Commits loaded per page in the selection step.
pub const PAGE_SIZE: usize = 20;

/// Where the wizard reads history from.
pub trait CommitSource {
    /// Up to `limit` commits, newest first.
    fn load_commits(&self, limit: usize) -> Result<Vec<RebaseCommit>, GitError>;
}

impl CommitSource for Git {
    fn load_commits(&self, limit: usize) -> Result<Vec<RebaseCommit>, GitError> {
        self.get_commit_log(limit)
    }
}

/// Abstract user intents, produced by [`super::keys::map_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Up,
    Down,
    /// Swap the current entry with the one above
    MoveUp,
    /// Swap the current entry with the one below
    MoveDown,
    CycleOp,
    SetOp(RebaseOp),
    Edit,
    /// Enter: choose, continue, or execute depending on the step
    Select,
    LoadMore,
    Back,
    /// Esc or q: discards an open editor, otherwise cancels
    Escape,
    /// Ctrl-C: always cancels
    Cancel,
    Insert(char),
    Newline,
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    /// Save the open editor
    Save,
}

/// Whether keys should be read as commands or as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    List,
    Text { multiline: bool },
}

/// Result of handling one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Continue,
    Done(WizardOutcome),
    Cancelled,
}

/// The edit list and base the user confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardOutcome {
    /// Oldest first
    pub entries: Vec<RebaseEntry>,
    /// Commit id to rebase onto; empty for the root
    pub base_ref: String,
}

// =============================================================================
// Sub-models
// =============================================================================

/// Commit selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectModel {
    /// Newest first
    pub commits: Vec<RebaseCommit>,
    pub cursor: usize,
    pub limit: usize,
    /// Fewer commits than `limit` came back, so the root row is shown
    pub exhausted: bool,
}

impl SelectModel {
    /// Visible rows: the commits plus the root row once history is exhausted.
    pub fn row_count(&self) -> usize {
        self.commits.len() + usize::from(self.exhausted)
    }

    pub fn is_root_row(&self, row: usize) -> bool {
        self.exhausted && row == self.commits.len()
    }
}

/// The edit list being built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditModel {
    /// Oldest first
    pub entries: Vec<RebaseEntry>,
    pub base_ref: String,
    pub cursor: usize,
    /// Inline message editor for the entry under the cursor
    pub editor: Option<TextInput>,
    /// The selection to return to on `Back`
    pub select: SelectModel,
}

/// Squash-message prompts, one parent at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquashModel {
    pub edit: EditModel,
    /// Parent indices still to prompt; the first is current
    pub pending: Vec<usize>,
    pub input: TextInput,
}

/// Confirmation choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfirmChoice {
    #[default]
    Execute,
    Back,
    Cancel,
}

impl ConfirmChoice {
    pub const ALL: [ConfirmChoice; 3] = [
        ConfirmChoice::Execute,
        ConfirmChoice::Back,
        ConfirmChoice::Cancel,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ConfirmChoice::Execute => "Execute",
            ConfirmChoice::Back => "Back",
            ConfirmChoice::Cancel => "Cancel",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|c| *c == self).unwrap_or(0)
    }
}

/// One wizard step with the model it owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    SelectCommit(SelectModel),
    PushWarning { edit: EditModel, pushed: usize },
    EditList(EditModel),
    SquashMessage(SquashModel),
    Confirm { edit: EditModel, choice: ConfirmChoice },
    Done,
    Cancelled,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::SelectCommit(_) => "select",
            Step::PushWarning { .. } => "push-warning",
            Step::EditList(_) => "edit",
            Step::SquashMessage(_) => "squash-message",
            Step::Confirm { .. } => "confirm",
            Step::Done => "done",
            Step::Cancelled => "cancelled",
        }
    }
}

// =============================================================================
// Wizard
// =============================================================================

/// The wizard state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wizard {
    step: Step,
    /// Skip the pushed-commit warning
    force: bool,
    /// One-line message shown under the current step
    notice: Option<String>,
}

impl Wizard {
    /// Load the first page of history and start at commit selection.
    pub fn new(source: &dyn CommitSource, force: bool) -> Result<Self, GitError> {
        let select = load_page(source, PAGE_SIZE, 0)?;
        if select.commits.is_empty() {
            return Err(GitError::NoCommits);
        }
        Ok(Self {
            step: Step::SelectCommit(select),
            force,
            notice: None,
        })
    }

    pub fn step(&self) -> &Step {
        &self.step
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn input_mode(&self) -> InputMode {
        match &self.step {
            Step::EditList(EditModel {
                editor: Some(_), ..
            }) => InputMode::Text { multiline: false },
            Step::SquashMessage(_) => InputMode::Text { multiline: true },
            _ => InputMode::List,
        }
    }

    /// Apply one action.
    pub fn handle(
        &mut self,
        action: Action,
        source: &dyn CommitSource,
    ) -> Result<Transition, GitError> {
        if action == Action::Cancel {
            self.step = Step::Cancelled;
            return Ok(Transition::Cancelled);
        }
        self.notice = None;

        let step = std::mem::replace(&mut self.step, Step::Cancelled);
        let (next, transition) = match step {
            Step::SelectCommit(model) => self.on_select(model, action, source)?,
            Step::PushWarning { edit, pushed } => on_push_warning(edit, pushed, action),
            Step::EditList(model) => self.on_edit(model, action),
            Step::SquashMessage(model) => on_squash(model, action),
            Step::Confirm { edit, choice } => on_confirm(edit, choice, action),
            done @ (Step::Done | Step::Cancelled) => (done, Transition::Continue),
        };
        self.step = next;
        Ok(transition)
    }

    // =========================================================================
    // SelectCommit
    // =========================================================================

    fn on_select(
        &mut self,
        mut model: SelectModel,
        action: Action,
        source: &dyn CommitSource,
    ) -> Result<(Step, Transition), GitError> {
        match action {
            Action::Up => model.cursor = model.cursor.saturating_sub(1),
            Action::Down => {
                if model.cursor + 1 < model.row_count() {
                    model.cursor += 1;
                } else if !model.exhausted {
                    model = load_page(source, model.limit + PAGE_SIZE, model.cursor + 1)?;
                }
            }
            Action::LoadMore if !model.exhausted => {
                model = load_page(source, model.limit + PAGE_SIZE, model.cursor)?;
            }
            Action::Select => return Ok(self.choose_base(model)),
            Action::Escape => return Ok((Step::Cancelled, Transition::Cancelled)),
            _ => {}
        }
        Ok((Step::SelectCommit(model), Transition::Continue))
    }

    fn choose_base(&mut self, model: SelectModel) -> (Step, Transition) {
        let row = model.cursor;
        let base_ref = if model.is_root_row(row) {
            String::new()
        } else {
            match model.commits.get(row) {
                Some(commit) => commit.id.clone(),
                None => return (Step::SelectCommit(model), Transition::Continue),
            }
        };

        let entries = entries_after(&model.commits, row);
        if entries.is_empty() {
            self.notice = Some("no commits after this one; choose an older commit".to_string());
            return (Step::SelectCommit(model), Transition::Continue);
        }

        let pushed = count_pushed(&entries);
        let edit = EditModel {
            entries,
            base_ref,
            cursor: 0,
            editor: None,
            select: model,
        };
        if pushed > 0 && !self.force {
            (Step::PushWarning { edit, pushed }, Transition::Continue)
        } else {
            (Step::EditList(edit), Transition::Continue)
        }
    }

    // =========================================================================
    // EditList
    // =========================================================================

    fn on_edit(&mut self, mut model: EditModel, action: Action) -> (Step, Transition) {
        if let Some(mut editor) = model.editor.take() {
            match action {
                Action::Save | Action::Select => {
                    let message = editor.value().trim().to_string();
                    if let Some(entry) = model.entries.get_mut(model.cursor) {
                        if !message.is_empty() {
                            entry.op = RebaseOp::Reword;
                            entry.new_message = message;
                            entry.edited = true;
                        }
                    }
                }
                Action::Escape => {}
                other => {
                    apply_text(&mut editor, other);
                    model.editor = Some(editor);
                }
            }
            return (Step::EditList(model), Transition::Continue);
        }

        let last = model.entries.len().saturating_sub(1);
        match action {
            Action::Up => model.cursor = model.cursor.saturating_sub(1),
            Action::Down => model.cursor = (model.cursor + 1).min(last),
            Action::MoveUp if model.cursor > 0 => {
                model.entries.swap(model.cursor, model.cursor - 1);
                model.cursor -= 1;
            }
            Action::MoveDown if model.cursor < last => {
                model.entries.swap(model.cursor, model.cursor + 1);
                model.cursor += 1;
            }
            Action::CycleOp => {
                if let Some(entry) = model.entries.get_mut(model.cursor) {
                    entry.op = entry.op.next();
                }
            }
            Action::SetOp(op) => {
                if let Some(entry) = model.entries.get_mut(model.cursor) {
                    entry.op = op;
                }
            }
            Action::Edit => {
                if let Some(entry) = model.entries.get(model.cursor) {
                    model.editor = Some(TextInput::single_line(entry.effective_message()));
                }
            }
            Action::Back => {
                let select = model.select;
                return (Step::SelectCommit(select), Transition::Continue);
            }
            Action::Select => return self.finish_edit(model),
            Action::Escape => return (Step::Cancelled, Transition::Cancelled),
            _ => {}
        }
        (Step::EditList(model), Transition::Continue)
    }

    /// Leave the edit list: prompt for squash messages, then confirm.
    fn finish_edit(&mut self, mut model: EditModel) -> (Step, Transition) {
        if let Some(i) = model
            .entries
            .iter()
            .position(|e| e.op == RebaseOp::Reword && e.new_message.trim().is_empty())
        {
            model.cursor = i;
            model.editor = Some(TextInput::single_line(model.entries[i].effective_message()));
            self.notice = Some("reword needs a new message".to_string());
            return (Step::EditList(model), Transition::Continue);
        }
        if let Err(err) = check_entries(&model.entries) {
            self.notice = Some(err.to_string());
            return (Step::EditList(model), Transition::Continue);
        }

        let pending = squash_parents_needing_message(&model.entries);
        (next_squash_or_confirm(model, pending), Transition::Continue)
    }
}

fn load_page(
    source: &dyn CommitSource,
    limit: usize,
    cursor: usize,
) -> Result<SelectModel, GitError> {
    let commits = source.load_commits(limit)?;
    let exhausted = commits.len() < limit;
    let rows = commits.len() + usize::from(exhausted);
    Ok(SelectModel {
        cursor: cursor.min(rows.saturating_sub(1)),
        commits,
        limit,
        exhausted,
    })
}

fn on_push_warning(edit: EditModel, pushed: usize, action: Action) -> (Step, Transition) {
    match action {
        Action::Select => (Step::EditList(edit), Transition::Continue),
        Action::Back => (Step::SelectCommit(edit.select), Transition::Continue),
        Action::Escape => (Step::Cancelled, Transition::Cancelled),
        _ => (Step::PushWarning { edit, pushed }, Transition::Continue),
    }
}

fn next_squash_or_confirm(edit: EditModel, pending: Vec<usize>) -> Step {
    match pending.first() {
        Some(&parent) => {
            let input = TextInput::multi_line(&combined_squash_message(&edit.entries, parent));
            Step::SquashMessage(SquashModel {
                edit,
                pending,
                input,
            })
        }
        None => Step::Confirm {
            edit,
            choice: ConfirmChoice::default(),
        },
    }
}

fn on_squash(mut model: SquashModel, action: Action) -> (Step, Transition) {
    match action {
        Action::Save => {
            let parent = model.pending.remove(0);
            let message = model.input.value().trim().to_string();
            if let Some(entry) = model.edit.entries.get_mut(parent) {
                if !message.is_empty() {
                    entry.new_message = message;
                    entry.edited = true;
                }
            }
            (
                next_squash_or_confirm(model.edit, model.pending),
                Transition::Continue,
            )
        }
        Action::Escape => (Step::EditList(model.edit), Transition::Continue),
        other => {
            apply_text(&mut model.input, other);
            (Step::SquashMessage(model), Transition::Continue)
        }
    }
}

fn on_confirm(edit: EditModel, choice: ConfirmChoice, action: Action) -> (Step, Transition) {
    let chosen = match action {
        Action::Left | Action::Up => {
            let i = choice.index().saturating_sub(1);
            return (
                Step::Confirm {
                    edit,
                    choice: ConfirmChoice::ALL[i],
                },
                Transition::Continue,
            );
        }
        Action::Right | Action::Down => {
            let i = (choice.index() + 1).min(ConfirmChoice::ALL.len() - 1);
            return (
                Step::Confirm {
                    edit,
                    choice: ConfirmChoice::ALL[i],
                },
                Transition::Continue,
            );
        }
        Action::Select => choice,
        Action::Back => ConfirmChoice::Back,
        Action::Escape => ConfirmChoice::Cancel,
        _ => return (Step::Confirm { edit, choice }, Transition::Continue),
    };

    match chosen {
        ConfirmChoice::Execute => (
            Step::Done,
            Transition::Done(WizardOutcome {
                entries: edit.entries,
                base_ref: edit.base_ref,
            }),
        ),
        ConfirmChoice::Back => (Step::EditList(edit), Transition::Continue),
        ConfirmChoice::Cancel => (Step::Cancelled, Transition::Cancelled),
    }
}

fn apply_text(input: &mut TextInput, action: Action) {
    match action {
        Action::Insert(c) => input.insert(c),
        Action::Newline => input.newline(),
        Action::Backspace => input.backspace(),
        Action::Delete => input.delete(),
        Action::Left => input.left(),
        Action::Right => input.right(),
        Action::Home => input.home(),
        Action::End => input.end(),
        _ => {}
    }
}
