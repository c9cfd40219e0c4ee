//! # symbios-sprout
//!
//! Procedural plant and fractal generation from stochastic L-System grammars,
//! interpreted by an engine-agnostic 3D turtle built on `glam`.
//!
//! A [`GrammarDefinition`] pairs each symbol with a draw-command string
//! (`"saveState; turnLeft 45"`) and a set of weighted rewrite alternatives.
//! [`LSystem`] compiles it, rewriting the state once per [`LSystem::grow`];
//! [`TurtleInterpreter`] replays the state through a [`Turtle`], which emits
//! ordered [`DrawEvent`]s into any [`GeometrySink`] (game engine, exporter,
//! or the in-memory [`GeometryBuffer`]).
//!
//! ```
//! use symbios_sprout::{presets, LSystem, Turtle, TurtleConfig, TurtleInterpreter};
//!
//! let lsystem = LSystem::seeded(&presets::fractal_plant(), 7).unwrap();
//! let mut interp = TurtleInterpreter::new(lsystem, Turtle::buffered(TurtleConfig::default()));
//! interp.grow();
//! interp.render().unwrap();
//!
//! // "F+[[X]-X]-F[-FX]+X" draws one line per F.
//! assert_eq!(interp.sink().lines().count(), 3);
//! ```

pub mod choice;
pub mod command;
pub mod error;
pub mod geometry;
pub mod grammar;
pub mod interpreter;
pub mod presets;
pub mod turtle;

pub use choice::*;
pub use command::*;
pub use error::*;
pub use geometry::*;
pub use grammar::*;
pub use interpreter::*;
pub use turtle::*;
