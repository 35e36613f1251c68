//! Subcommands of the `gittrain` binary, each an `impl App` block.

mod abort;
mod rebase;
mod status;
