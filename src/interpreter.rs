//! Binding between an [`LSystem`] and the [`Turtle`] that draws it.
//!
//! The entry point is [`TurtleInterpreter`]. Build one from a compiled grammar
//! and a turtle, call [`grow`](TurtleInterpreter::grow) to advance the grammar
//! and [`render`](TurtleInterpreter::render) to replay the current state into
//! the turtle's sink.

use crate::error::TurtleError;
use crate::geometry::{GeometryBuffer, GeometrySink};
use crate::grammar::LSystem;
use crate::turtle::Turtle;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Drives one [`Turtle`] from one [`LSystem`].
#[derive(Debug)]
pub struct TurtleInterpreter<S: GeometrySink = GeometryBuffer, R = ChaCha8Rng> {
    lsystem: LSystem<R>,
    turtle: Turtle<S>,
}

impl<S: GeometrySink, R: Rng> TurtleInterpreter<S, R> {
    /// Binds `lsystem` to `turtle`; nothing is drawn until [`render`](Self::render).
    pub fn new(lsystem: LSystem<R>, turtle: Turtle<S>) -> Self {
        Self { lsystem, turtle }
    }

    /// Advances the grammar one generation. See [`LSystem::grow`].
    pub fn grow(&mut self) -> bool {
        self.lsystem.grow()
    }

    /// Replays the current grammar state through the turtle.
    ///
    /// The turtle is always reset first and the sink receives the grammar's
    /// resource counts as a pre-sizing hint. Symbols are executed in sequence
    /// order; symbols without a draw rule are skipped.
    ///
    /// # Errors
    ///
    /// Stops at the first [`TurtleError`]. Geometry emitted before the failure
    /// stays in the sink but the pass as a whole should be discarded.
    pub fn render(&mut self) -> Result<(), TurtleError> {
        let hints = self.lsystem.resource_counts();
        debug!(
            generation = self.lsystem.age(),
            symbols = self.lsystem.state().len(),
            lines = hints.lines,
            points = hints.points,
            "render pass"
        );

        self.turtle.reset();
        self.turtle.reserve(hints);
        for command in self.lsystem.draw_sequence() {
            command.execute(&mut self.turtle)?;
        }
        Ok(())
    }

    /// Grows one generation and renders the result.
    ///
    /// Returns whether the grammar actually grew; the state is rendered either way.
    pub fn step(&mut self) -> Result<bool, TurtleError> {
        let grew = self.grow();
        self.render()?;
        Ok(grew)
    }
}

impl<S: GeometrySink, R> TurtleInterpreter<S, R> {
    pub fn lsystem(&self) -> &LSystem<R> {
        &self.lsystem
    }

    pub fn turtle(&self) -> &Turtle<S> {
        &self.turtle
    }

    /// The render target of the bound turtle.
    pub fn sink(&self) -> &S {
        self.turtle.sink()
    }

    /// Unbinds the grammar and the turtle.
    pub fn into_parts(self) -> (LSystem<R>, Turtle<S>) {
        (self.lsystem, self.turtle)
    }
}
