pub mod render;

#[derive(Debug)]
pub enum Action {
    Render(render::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub fn execute(self) -> anyhow::Result<()> {
        match self {
            Self::Render(args) => render::execute(&args),
        }
    }
}
