//! Built-in sample grammars.

use crate::grammar::GrammarDefinition;

/// Binary fractal tree: `0 -> 1[0]0`, `1 -> 11`, branching at 45 degrees.
pub fn binary_tree() -> GrammarDefinition {
    GrammarDefinition::new("0")
        .draw('0', "move 1")
        .draw('1', "move 1")
        .draw('[', "saveState; turnLeft 45")
        .draw(']', "restoreState; turnRight 45")
        .production('0', "1[0]0", 1.0)
        .production('1', "11", 1.0)
}

/// Barnsley-style fractal plant with 25 degree branching.
///
/// `X` steers the shape but draws nothing.
pub fn fractal_plant() -> GrammarDefinition {
    GrammarDefinition::new("X")
        .draw('X', "")
        .draw('F', "move 1")
        .draw('[', "saveState")
        .draw(']', "restoreState")
        .draw('+', "turnRight 25")
        .draw('-', "turnLeft 25")
        .production('X', "F+[[X]-X]-F[-FX]+X", 1.0)
        .production('F', "FF", 1.0)
}

/// Fractal plant whose stems randomly fork, stretch or stop.
pub fn stochastic_plant() -> GrammarDefinition {
    GrammarDefinition::new("F")
        .draw('F', "color saddlebrown; move 1")
        .draw('L', "color forestgreen; point 0.2")
        .draw('[', "saveState")
        .draw(']', "restoreState")
        .draw('+', "turnLeft 22.5")
        .draw('-', "turnRight 22.5")
        .draw('&', "turnUp 22.5")
        .draw('/', "rotate 137.5")
        .production('F', "F[+F]F[-F]F", 1.0)
        .production('F', "F[+F]F", 1.0)
        .production('F', "F[&/F]FL", 1.0)
        .production('F', "FL", 0.25)
        .max_generation(5)
}
