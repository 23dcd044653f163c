//! # Painter Command Language
//!
//! One command per line, arguments separated by whitespace:
//!
//! ```text
//! white                 fill the background white
//! green                 fill the background green
//! bgrect x1 y1 x2 y2    black rectangle between two corners
//! figure x y            add a cross centered at (x, y)
//! move x y              move every cross to (x, y)
//! reset                 white background, no shapes
//! update                render and present the canvas
//! ```
//!
//! Coordinates are normalized to the canvas: `0.5 0.5` is the center.
//!
//! ## Example
//!
//! ```rust,ignore
//! let ops = Parser::new().parse("green\nfigure 0.5 0.5\nupdate\n".as_bytes())?;
//! for op in ops {
//!     handle.post_boxed(op)?;
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

use std::io::{BufRead, BufReader, Read};

use painter_core::{
    CrossConfig, FillOperation, Operation, PainterError, PainterResult, ShapeOperation,
    UpdateOperation,
};

/// Commands understood by the parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// `white`
    White,
    /// `green`
    Green,
    /// `bgrect x1 y1 x2 y2`
    BgRect,
    /// `figure x y`
    Figure,
    /// `move x y`
    Move,
    /// `reset`
    Reset,
    /// `update`
    Update,
}

impl Command {
    /// Looks up a command by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "white" => Self::White,
            "green" => Self::Green,
            "bgrect" => Self::BgRect,
            "figure" => Self::Figure,
            "move" => Self::Move,
            "reset" => Self::Reset,
            "update" => Self::Update,
            _ => return None,
        })
    }

    /// The command's name in scripts.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Green => "green",
            Self::BgRect => "bgrect",
            Self::Figure => "figure",
            Self::Move => "move",
            Self::Reset => "reset",
            Self::Update => "update",
        }
    }
}

/// Line-oriented parser producing boxed operations.
#[derive(Clone, Copy, Debug, Default)]
pub struct Parser {
    cross: CrossConfig,
}

impl Parser {
    /// Parser with default cross dimensions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser whose `figure` commands use `cross` dimensions.
    #[must_use]
    pub fn with_cross(cross: CrossConfig) -> Self {
        Self { cross }
    }

    /// Parses a single line. Blank lines yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown commands and malformed arguments.
    pub fn parse_line(&self, line: &str) -> PainterResult<Option<Box<dyn Operation>>> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();
        let command =
            Command::from_name(name).ok_or_else(|| PainterError::UnknownCommand(name.to_string()))?;

        let op: Box<dyn Operation> = match command {
            Command::White => {
                no_args(command, &args)?;
                Box::new(FillOperation::white())
            }
            Command::Green => {
                no_args(command, &args)?;
                Box::new(FillOperation::green())
            }
            Command::Reset => {
                no_args(command, &args)?;
                Box::new(ShapeOperation::Reset)
            }
            Command::Update => {
                no_args(command, &args)?;
                Box::new(UpdateOperation)
            }
            Command::BgRect => Box::new(ShapeOperation::background_rect(&args)?),
            Command::Figure => Box::new(ShapeOperation::figure_with(&args, self.cross)?),
            Command::Move => Box::new(ShapeOperation::move_to(&args)?),
        };
        Ok(Some(op))
    }

    /// Parses a whole script, failing on the first bad line.
    ///
    /// # Errors
    ///
    /// Returns IO errors from `reader`, or the first parse error annotated
    /// with its 1-based line number.
    pub fn parse(&self, reader: impl Read) -> PainterResult<Vec<Box<dyn Operation>>> {
        let mut ops = Vec::new();
        for (index, line) in BufReader::new(reader).lines().enumerate() {
            let line = line?;
            if let Some(op) = self.parse_line(&line).map_err(|e| e.at_line(index + 1))? {
                ops.push(op);
            }
        }
        Ok(ops)
    }

    /// Parses a whole script, skipping (and logging) bad lines.
    ///
    /// # Errors
    ///
    /// Returns IO errors from `reader` only.
    pub fn parse_lenient(&self, reader: impl Read) -> PainterResult<Vec<Box<dyn Operation>>> {
        let mut ops = Vec::new();
        for (index, line) in BufReader::new(reader).lines().enumerate() {
            let line = line?;
            match self.parse_line(&line) {
                Ok(Some(op)) => ops.push(op),
                Ok(None) => {}
                Err(e) => tracing::warn!(line = index + 1, error = %e, "skipping command"),
            }
        }
        Ok(ops)
    }

    /// Parses a script held in memory.
    ///
    /// # Errors
    ///
    /// As [`parse`](Self::parse).
    pub fn parse_str(&self, script: &str) -> PainterResult<Vec<Box<dyn Operation>>> {
        self.parse(script.as_bytes())
    }
}

fn no_args(command: Command, args: &[&str]) -> PainterResult<()> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(PainterError::InvalidArgumentCount {
            command: command.name(),
            expected: 0,
            actual: args.len(),
        })
    }
}

/// Anything that reads lines as a [`BufRead`] can be parsed lazily, one
/// operation at a time.
pub struct Operations<'p, R> {
    parser: &'p Parser,
    lines: std::io::Lines<R>,
    line: usize,
}

impl Parser {
    /// Lazily parses `reader`, yielding one result per non-blank line.
    pub fn operations<R: BufRead>(&self, reader: R) -> Operations<'_, R> {
        Operations {
            parser: self,
            lines: reader.lines(),
            line: 0,
        }
    }
}

impl<R: BufRead> Iterator for Operations<'_, R> {
    type Item = PainterResult<Box<dyn Operation>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line += 1;
            match self.parser.parse_line(&line) {
                Ok(Some(op)) => return Some(Ok(op)),
                Ok(None) => {}
                Err(e) => return Some(Err(e.at_line(self.line))),
            }
        }
    }
}
