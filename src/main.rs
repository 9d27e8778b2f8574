//! Idle Bricks command line entry point
//!
//! Small tooling around the core: create, inspect and rewrite save files, and
//! check level layout strings.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::{Path, PathBuf};
    use std::time::{SystemTime, UNIX_EPOCH};

    use glam::IVec2;
    use idle_bricks::board::{Brick, BrickKind};
    use idle_bricks::persistence::layout;
    use idle_bricks::{CoreError, CoreResult, GameState, Settings};

    const SETTINGS_FILE: &str = "idle-bricks.json";

    const USAGE: &str = "usage: idle-bricks <command>

commands:
  new <out>           write a fresh save with a starter base
  inspect <save>      summarize a save file
  layout <file>       decode a level layout string and re-encode it
  resave <in> <out>   load a save (migrating older versions) and write it back";

    pub enum Command {
        New(PathBuf),
        Inspect(PathBuf),
        Layout(PathBuf),
        Resave(PathBuf, PathBuf),
    }

    impl Command {
        pub fn parse(args: &[String]) -> Option<Self> {
            match args {
                [cmd, out] if cmd == "new" => Some(Self::New(out.into())),
                [cmd, save] if cmd == "inspect" => Some(Self::Inspect(save.into())),
                [cmd, file] if cmd == "layout" => Some(Self::Layout(file.into())),
                [cmd, input, out] if cmd == "resave" => {
                    Some(Self::Resave(input.into(), out.into()))
                }
                _ => None,
            }
        }
    }

    /// Unix time in milliseconds, as stored in save documents
    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0)
    }

    fn read_save(settings: &Settings, path: &Path) -> CoreResult<GameState> {
        let json = std::fs::read_to_string(path)?;
        let mut state = GameState::new(settings.clone());
        state.load_save_json(&json)?;
        Ok(state)
    }

    fn new_save(settings: &Settings, out: &Path) -> CoreResult<()> {
        let mut state = GameState::new(settings.clone());
        let center = state.board.origin_offset();
        state.place_brick(Brick::new(BrickKind::Goal, 1), center - IVec2::ONE)?;
        state.place_brick(Brick::new(BrickKind::Granary, 1), IVec2::ZERO)?;
        std::fs::write(out, state.to_save_json(now())?)?;
        log::info!("New save written to {}", out.display());
        Ok(())
    }

    fn inspect(settings: &Settings, path: &Path) -> CoreResult<()> {
        let state = read_save(settings, path)?;
        let level = state.player_level();
        let goal = state.goal_level();
        println!("player level {} ({} xp into it)", level.level, level.remainder);
        println!("goal level   {}", goal.level);
        for (kind, amount) in state.resources.iter() {
            match state.resources.capacity(kind) {
                Some(cap) => println!("  {:<8} {amount}/{cap}", kind.as_str()),
                None => println!("  {:<8} {amount}", kind.as_str()),
            }
        }
        println!("equipment    {}", state.inventory.equipment().len());
        println!(
            "bricks       {} ({} overlays, {} unattached)",
            state.board.brick_count(),
            state.board.overlays().len(),
            state.board.overlays().unattached().count()
        );
        for (ball, enchant) in state.enchantments.iter() {
            if enchant.level > 1 {
                println!("  {:<8} enchant level {}", ball.as_str(), enchant.level);
            }
        }
        Ok(())
    }

    fn check_layout(settings: &Settings, path: &Path) -> CoreResult<()> {
        let text = std::fs::read_to_string(path)?;
        let board = layout::decode(text.trim(), settings.board_cols, settings.board_rows);
        println!("{} bricks decoded", board.brick_count());
        println!("{}", layout::encode(&board));
        Ok(())
    }

    fn resave(settings: &Settings, input: &Path, out: &Path) -> CoreResult<()> {
        let state = read_save(settings, input)?;
        std::fs::write(out, state.to_save_json(now())?)?;
        log::info!("Resaved {} to {}", input.display(), out.display());
        Ok(())
    }

    pub fn run(command: Command) -> Result<(), CoreError> {
        let settings = Settings::load(Path::new(SETTINGS_FILE));
        match command {
            Command::New(out) => new_save(&settings, &out),
            Command::Inspect(path) => inspect(&settings, &path),
            Command::Layout(path) => check_layout(&settings, &path),
            Command::Resave(input, out) => resave(&settings, &input, &out),
        }
    }

    pub fn usage() -> &'static str {
        USAGE
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = cli::Command::parse(&args) else {
        eprintln!("{}", cli::usage());
        std::process::exit(2);
    };
    if let Err(e) = cli::run(command) {
        log::error!("{e}");
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The core is used as a library on the web
}
