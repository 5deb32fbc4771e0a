use std::process::ExitCode;

use self::config::{parse_args_or_exit, AsctConfig};
use self::errors::Diagnostics;

pub mod config;
mod dump;
mod errors;
mod passes;

pub enum CompilationControl {
    Continue,
    Stop,
}

pub struct PassOutput<O> {
    pub output: O,
    pub compilation_control: CompilationControl,
}

impl<O> PassOutput<O> {
    pub fn stop_with_output(output: O) -> Self {
        Self {
            output,
            compilation_control: CompilationControl::Stop,
        }
    }

    pub fn continue_with_output(output: O) -> Self {
        Self {
            output,
            compilation_control: CompilationControl::Continue,
        }
    }
}

impl PassOutput<()> {
    pub fn stop() -> Self {
        Self::stop_with_output(())
    }
}

pub struct RunnerCtx {
    pub config: AsctConfig,
    pub diagnostics: Diagnostics,
}

impl RunnerCtx {
    pub fn stop_if_errors<O>(&self, output: O) -> PassOutput<O> {
        PassOutput {
            output,
            compilation_control: if self.diagnostics.has_errors() {
                CompilationControl::Stop
            } else {
                CompilationControl::Continue
            },
        }
    }
}

macro_rules! return_if_stopped {
    ($ctx:expr, $e:expr) => {
        match $e {
            PassOutput {
                compilation_control: CompilationControl::Stop,
                ..
            } => {
                return if $ctx.diagnostics.has_errors() {
                    ExitCode::FAILURE
                } else {
                    ExitCode::SUCCESS
                }
            }

            PassOutput { output, .. } => output,
        }
    };
}

fn run(mut ctx: RunnerCtx) -> ExitCode {
    let files = return_if_stopped!(ctx, passes::load_files(&mut ctx));

    let tokens = return_if_stopped!(ctx, passes::lex_all(&mut ctx, &files));
    let tokens = return_if_stopped!(ctx, passes::dump_tokens_if_asked(&mut ctx, tokens));

    let asts = return_if_stopped!(ctx, passes::parse_all(&mut ctx, &files, tokens));
    let asts = return_if_stopped!(ctx, passes::dump_asts_if_asked(&mut ctx, asts));

    return_if_stopped!(ctx, passes::write_all(&mut ctx, &asts));

    ExitCode::SUCCESS
}

pub fn prepare_and_run() -> ExitCode {
    let config = parse_args_or_exit();

    let ctx = RunnerCtx {
        config,
        diagnostics: Diagnostics::new(),
    };

    run(ctx)
}
