//! Command dispatch

use std::io;
use std::path::PathBuf;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::render::CHAR_WIDTH;
use crate::application::{Rect, RuleColumn, RuleListPanel, RuleListView, TextSurface};
use crate::cli::args::{Cli, Commands, ConfigCommands, SortColumn, StateCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, project_dir_or_cwd, Settings};
use crate::domain::{rule_ref, DomainError, LabelProvider, LabelRule, NodeId, RuleRef};
use crate::infrastructure::di::ServiceContainer;
use crate::tree_traits::TreeNodeConvert;

/// Narrowest list output that still fits the three column minimums.
const MIN_WIDTH: u16 = 20;

/// Resolved file locations plus wired services.
struct Context {
    services: ServiceContainer,
    rules_path: PathBuf,
    state_path: PathBuf,
}

impl Context {
    fn new(cli: &Cli) -> CliResult<Self> {
        let settings = load_settings(cli)?;
        let rules_path = cli
            .rules
            .clone()
            .unwrap_or_else(|| settings.rules_file.clone());
        let state_path = cli
            .state
            .clone()
            .unwrap_or_else(|| settings.state_file.clone());
        debug!(
            "rules: {}, state: {}",
            rules_path.display(),
            state_path.display()
        );
        Ok(Self {
            services: ServiceContainer::new(settings),
            rules_path,
            state_path,
        })
    }

    fn load_rules(&self) -> CliResult<Vec<RuleRef<LabelRule>>> {
        Ok(self.services.rules.load(&self.rules_path)?)
    }

    fn save_rules(&self, rules: &[RuleRef<LabelRule>]) -> CliResult<()> {
        Ok(self.services.rules.save(&self.rules_path, rules)?)
    }

    /// Build the rule list view over `rules` from persisted state.
    fn open_view(&self, rules: &[RuleRef<LabelRule>]) -> CliResult<RuleListView<LabelRule>> {
        let state = self.services.state.load(&self.state_path)?;
        let mut view = RuleListView::from_settings(state, &self.services.settings);
        view.sync(rules)?;
        Ok(view)
    }

    /// Persist the selection of `view` against the changed collection `rules`.
    ///
    /// Ids are re-derived from a view synced the way the next invocation syncs it.
    fn carry_selection(
        &self,
        view: RuleListView<LabelRule>,
        rules: &[RuleRef<LabelRule>],
    ) -> CliResult<()> {
        let selected: Vec<RuleRef<LabelRule>> = view
            .tree()
            .selection()
            .iter()
            .filter_map(|&id| view.rule(id))
            .collect();
        let mut state = view.into_state();
        state.selection.clear();
        state.expanded.clear();

        let mut next = RuleListView::from_settings(state, &self.services.settings);
        next.sync(rules)?;
        let ids: Vec<NodeId> = selected.iter().filter_map(|r| next.find(r)).collect();
        debug!("carry_selection: {} of {} rules", ids.len(), selected.len());
        next.tree_mut().set_selection(ids);
        self.save_view(next)
    }

    fn save_view(&self, view: RuleListView<LabelRule>) -> CliResult<()> {
        Ok(self
            .services
            .state
            .save(&self.state_path, &view.into_state())?)
    }
}

/// Settings with the local layer read from `-C` or the current directory.
fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let project_dir = project_dir_or_cwd(cli.project_dir.as_deref())?;
    Ok(Settings::load(Some(&project_dir))?)
}

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::List {
            search,
            sort,
            desc,
            select,
            width,
        }) => _list(
            cli,
            search.as_deref(),
            *sort,
            *desc,
            select.as_deref(),
            *width,
        ),
        Some(Commands::Add {
            name,
            index,
            groups,
            label,
        }) => _add(cli, name, *index, groups, label.as_deref()),
        Some(Commands::Remove { name }) => _remove(cli, name),
        Some(Commands::Rename { old, new }) => _rename(cli, old, new),
        Some(Commands::Tree) => _tree(cli),
        Some(Commands::State { command }) => _state(cli, command),
        Some(Commands::Config { command }) => _config(cli, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage("no command given, see --help".to_string())),
    }
}

#[instrument(skip(cli))]
fn _list(
    cli: &Cli,
    search: Option<&str>,
    sort: Option<SortColumn>,
    desc: bool,
    select: Option<&str>,
    width: u16,
) -> CliResult<()> {
    if width < MIN_WIDTH {
        return Err(CliError::InvalidArgs(format!(
            "width must be at least {}, got {}",
            MIN_WIDTH, width
        )));
    }
    let ctx = Context::new(cli)?;
    let rules = ctx.load_rules()?;
    let view = ctx.open_view(&rules)?;
    let mut panel = RuleListPanel::new(view);

    if let Some(name) = select {
        let id = panel
            .view()
            .find_by_name(name)
            .ok_or_else(|| DomainError::RuleNotFound(name.to_string()))?;
        panel.view_mut().select(id);
    }
    if let Some(column) = sort {
        panel.view_mut().sort(RuleColumn::from(column), !desc)?;
    }
    panel.handle_search_input(search.unwrap_or_default())?;

    let view = panel.view();
    let row_height = view.tree().row_height();
    let height = (view.tree().row_count() + 2) as f32 * row_height;
    let rect = Rect::new(0.0, 0.0, f32::from(width) * CHAR_WIDTH, height);
    let mut surface =
        TextSurface::new().with_alternating_rows(ctx.services.settings.alternating_rows);
    panel.do_layout(&mut surface, rect)?;
    output::info(&surface.render());

    if view.tree().row_count() == 0 {
        output::warning("no rules to show");
    }
    ctx.save_view(panel.into_view())
}

#[instrument(skip(cli, groups))]
fn _add(
    cli: &Cli,
    name: &str,
    index: Option<usize>,
    groups: &[String],
    label: Option<&str>,
) -> CliResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::EmptyRuleName.into());
    }
    let ctx = Context::new(cli)?;
    let mut rules = ctx.load_rules()?;
    let view = ctx.open_view(&rules)?;

    let provider = label
        .map(|l| LabelProvider::Constant {
            label: l.to_string(),
        })
        .unwrap_or_default();
    let rule = rule_ref(
        LabelRule::new(name)
            .with_groups(groups.iter().cloned())
            .with_provider(provider),
    );
    let position = index.unwrap_or(rules.len()).min(rules.len());
    rules.insert(position, rule);

    ctx.save_rules(&rules)?;
    output::success(&format!("added rule '{}' at {}", name, position));
    ctx.carry_selection(view, &rules)
}

#[instrument(skip(cli))]
fn _remove(cli: &Cli, name: &str) -> CliResult<()> {
    let ctx = Context::new(cli)?;
    let mut rules = ctx.load_rules()?;
    let view = ctx.open_view(&rules)?;
    let position = rules
        .iter()
        .position(|r| r.borrow().name == name)
        .ok_or_else(|| DomainError::RuleNotFound(name.to_string()))?;
    rules.remove(position);

    ctx.save_rules(&rules)?;
    output::success(&format!("removed rule '{}'", name));
    ctx.carry_selection(view, &rules)
}

#[instrument(skip(cli))]
fn _rename(cli: &Cli, old: &str, new: &str) -> CliResult<()> {
    if new.trim().is_empty() {
        return Err(DomainError::EmptyRuleName.into());
    }
    let ctx = Context::new(cli)?;
    let rules = ctx.load_rules()?;
    let mut view = ctx.open_view(&rules)?;

    let id = view
        .find_by_name(old)
        .ok_or_else(|| DomainError::RuleNotFound(old.to_string()))?;
    if !view.rename(id, new)? {
        output::warning(&format!("rule '{}' was not renamed", old));
        return Ok(());
    }

    ctx.save_rules(&rules)?;
    output::success(&format!("renamed '{}' to '{}'", old, new));
    ctx.save_view(view)
}

#[instrument(skip(cli))]
fn _tree(cli: &Cli) -> CliResult<()> {
    let ctx = Context::new(cli)?;
    let rules = ctx.load_rules()?;
    let view = ctx.open_view(&rules)?;
    output::info(&view.tree().arena().to_tree_string());
    Ok(())
}

#[instrument(skip(cli))]
fn _state(cli: &Cli, command: &StateCommands) -> CliResult<()> {
    let ctx = Context::new(cli)?;
    match command {
        StateCommands::Show => {
            let state = ctx.services.state.load(&ctx.state_path)?;
            output::header(&ctx.state_path.display());
            output::info(&state.to_toml()?);
        }
        StateCommands::Reset => {
            if ctx.services.state.reset(&ctx.state_path)? {
                output::success(&format!("removed {}", ctx.state_path.display()));
            } else {
                output::warning(&format!("no state at {}", ctx.state_path.display()));
            }
        }
    }
    Ok(())
}

#[instrument(skip(cli))]
fn _config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::info(&path.display()),
            None => output::warning("no config directory for this platform"),
        },
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}
