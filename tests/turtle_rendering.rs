// tests/turtle_rendering.rs
use glam::{Quat, Vec3};
use symbios_sprout::{
    presets, Color, CommandSurface, DrawEvent, GeometryBuffer, GeometrySink, GrammarDefinition,
    LSystem, LineSegment, PointMarker, ResourceCounts, Turtle, TurtleConfig, TurtleError,
    TurtleInterpreter, compile,
};

fn interpreter(def: &GrammarDefinition) -> TurtleInterpreter {
    let lsystem = LSystem::seeded(def, 0).unwrap();
    TurtleInterpreter::new(lsystem, Turtle::buffered(TurtleConfig::default()))
}

#[test]
fn test_draw_order_fidelity() {
    let def = GrammarDefinition::new("AB")
        .draw('A', "move 1")
        .draw('B', "move 2");
    let mut interp = interpreter(&def);
    interp.render().unwrap();

    // Turtle starts at the origin heading +X.
    // A: (0,0,0) -> (1,0,0), B: (1,0,0) -> (3,0,0)
    let lines: Vec<&LineSegment> = interp.sink().lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(interp.sink().len(), 2);
    assert_eq!(lines[0].length(), 1.0);
    assert_eq!(lines[1].length(), 2.0);
    assert_eq!(lines[0].end, lines[1].start);
    assert_eq!(lines[1].end, Vec3::new(3.0, 0.0, 0.0));
}

#[test]
fn test_render_resets_previous_pass() {
    let def = GrammarDefinition::new("A").draw('A', "move 1");
    let mut interp = interpreter(&def);

    interp.render().unwrap();
    interp.render().unwrap();

    // Second pass replaces, not appends, and starts again from the origin.
    assert_eq!(interp.sink().len(), 1);
    assert_eq!(interp.turtle().position(), Vec3::new(1.0, 0.0, 0.0));
}

#[test]
fn test_balanced_stack_restores_pose() {
    let def = GrammarDefinition::new("F[+F]F")
        .draw('F', "move 1")
        .draw('+', "turnLeft 90; color #ff0000")
        .draw('[', "saveState")
        .draw(']', "restoreState");
    let mut interp = interpreter(&def);
    interp.render().unwrap();

    // F: (0,0,0)->(1,0,0)
    // [+F]: branch heads -Z in red, (1,0,0)->(1,0,-1), then pose and pen restored
    // F: (1,0,0)->(2,0,0) in white
    let lines: Vec<&LineSegment> = interp.sink().lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].end.abs_diff_eq(Vec3::new(1.0, 0.0, -1.0), 1e-5));
    assert_eq!(lines[1].color, Color::rgb(1.0, 0.0, 0.0));
    assert_eq!(lines[2].start, Vec3::new(1.0, 0.0, 0.0));
    assert!(lines[2].end.abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-5));
    assert_eq!(lines[2].color, Color::WHITE);
    assert_eq!(interp.turtle().stack_depth(), 0);
}

#[test]
fn test_unbalanced_restore_fails_and_keeps_geometry() {
    let def = GrammarDefinition::new("F]F")
        .draw('F', "move 1")
        .draw(']', "restoreState");
    let mut interp = interpreter(&def);

    assert_eq!(interp.render(), Err(TurtleError::EmptyStack));
    // The first F was drawn before the failure; the second never ran.
    assert_eq!(interp.sink().len(), 1);
    assert_eq!(interp.turtle().position(), Vec3::new(1.0, 0.0, 0.0));
}

#[test]
fn test_color_does_not_recolor_existing_geometry() {
    let def = GrammarDefinition::new("FCFP")
        .draw('F', "move 1")
        .draw('C', "color 0x00ff00")
        .draw('P', "point 0.5");
    let mut interp = interpreter(&def);
    interp.render().unwrap();

    let events = &interp.sink().events;
    let green = Color::rgb(0.0, 1.0, 0.0);
    assert!(matches!(events[0], DrawEvent::Line(l) if l.color == Color::WHITE));
    assert!(matches!(events[1], DrawEvent::Line(l) if l.color == green));
    match events[2] {
        DrawEvent::Point(p) => {
            assert_eq!(p.color, green);
            assert_eq!(p.radius, 0.5);
            assert_eq!(p.position, Vec3::new(2.0, 0.0, 0.0));
        }
        other => panic!("expected a point, got {other:?}"),
    }
}

#[test]
fn test_absolute_moves() {
    let def = GrammarDefinition::new("JM")
        .draw('J', "jumpTo 0 5 0")
        .draw('M', "moveTo 0 5 2");
    let mut interp = interpreter(&def);
    interp.render().unwrap();

    let lines: Vec<&LineSegment> = interp.sink().lines().collect();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].start, Vec3::new(0.0, 5.0, 0.0));
    assert_eq!(lines[0].end, Vec3::new(0.0, 5.0, 2.0));
}

#[test]
fn test_binary_tree_geometry_matches_hints() {
    let mut interp = interpreter(&presets::binary_tree());
    for _ in 0..4 {
        assert!(interp.step().unwrap());
    }

    let hints = interp.lsystem().resource_counts();
    assert_eq!(interp.sink().lines().count(), hints.lines);
    assert_eq!(interp.sink().points().count(), hints.points);
    assert_eq!(interp.turtle().stack_depth(), 0);
}

#[test]
fn test_exhausted_step_still_renders() {
    let def = presets::binary_tree().max_generation(1);
    let mut interp = interpreter(&def);

    assert!(interp.step().unwrap());
    assert!(!interp.step().unwrap());
    // "1[0]0" draws three unit lines
    assert_eq!(interp.sink().len(), 3);
}

#[test]
fn test_parts_hand_back_grammar_and_geometry() {
    let mut interp = interpreter(&presets::binary_tree());
    interp.step().unwrap();

    let (lsystem, turtle) = interp.into_parts();
    assert_eq!(lsystem.age(), 1);
    let buffer = turtle.into_sink();
    // "1[0]0" draws three unit lines
    assert_eq!(buffer.lines().count(), 3);
    assert!(buffer.lines().all(|l| (l.length() - 1.0).abs() < 1e-5));
}

/// Sink that records the hint and counts events without storing them.
#[derive(Default)]
struct CountingSink {
    hint: Option<ResourceCounts>,
    lines: usize,
    points: usize,
    clears: usize,
}

impl GeometrySink for CountingSink {
    fn clear(&mut self) {
        self.clears += 1;
        self.lines = 0;
        self.points = 0;
    }

    fn reserve(&mut self, hints: ResourceCounts) {
        self.hint = Some(hints);
    }

    fn line(&mut self, _segment: LineSegment) {
        self.lines += 1;
    }

    fn point(&mut self, _marker: PointMarker) {
        self.points += 1;
    }
}

#[test]
fn test_custom_sink_receives_hints() {
    let lsystem = LSystem::seeded(&presets::stochastic_plant(), 3).unwrap();
    let mut interp = TurtleInterpreter::new(
        lsystem,
        Turtle::new(CountingSink::default(), TurtleConfig::default()),
    );
    interp.grow();
    interp.grow();
    interp.render().unwrap();

    let sink = interp.sink();
    assert_eq!(sink.clears, 1);
    assert_eq!(
        sink.hint,
        Some(ResourceCounts {
            lines: sink.lines,
            points: sink.points
        })
    );
}

#[test]
fn test_turtle_borrows_external_buffer() {
    let mut buffer = GeometryBuffer::new();
    {
        let mut turtle = Turtle::new(&mut buffer, TurtleConfig::default());
        compile("move 1; turnUp 90; move 1")
            .unwrap()
            .execute(&mut turtle)
            .unwrap();
    }
    let end = buffer.lines().last().unwrap().end;
    assert!(end.abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-5));
}

#[test]
fn test_reset_returns_to_configured_pose() {
    let config = TurtleConfig {
        initial_position: Vec3::new(0.0, 1.0, 0.0),
        default_color: Color::BLACK,
        ..Default::default()
    };
    let mut turtle = Turtle::buffered(config);
    turtle.set_color(Color::WHITE);
    turtle.move_forward(3.0);
    turtle.save_state().unwrap();
    turtle.turn_left(30.0);

    turtle.reset();
    assert_eq!(turtle.position(), Vec3::new(0.0, 1.0, 0.0));
    assert_eq!(turtle.rotation(), Quat::IDENTITY);
    assert_eq!(turtle.color(), Color::BLACK);
    assert_eq!(turtle.stack_depth(), 0);
    assert!(turtle.sink().is_empty());
}

/// A surface that records primitive names, for checking dispatch order.
#[derive(Default)]
struct Recorder(Vec<String>);

impl CommandSurface for Recorder {
    type Error = std::convert::Infallible;

    fn move_forward(&mut self, distance: f32) {
        self.0.push(format!("move {distance}"));
    }
    fn jump(&mut self, distance: f32) {
        self.0.push(format!("jump {distance}"));
    }
    fn move_to(&mut self, p: Vec3) {
        self.0.push(format!("moveTo {} {} {}", p.x, p.y, p.z));
    }
    fn jump_to(&mut self, p: Vec3) {
        self.0.push(format!("jumpTo {} {} {}", p.x, p.y, p.z));
    }
    fn turn_right(&mut self, degrees: f32) {
        self.0.push(format!("turnRight {degrees}"));
    }
    fn turn_left(&mut self, degrees: f32) {
        self.0.push(format!("turnLeft {degrees}"));
    }
    fn turn_up(&mut self, degrees: f32) {
        self.0.push(format!("turnUp {degrees}"));
    }
    fn turn_down(&mut self, degrees: f32) {
        self.0.push(format!("turnDown {degrees}"));
    }
    fn rotate(&mut self, degrees: f32) {
        self.0.push(format!("rotate {degrees}"));
    }
    fn point(&mut self, style: symbios_sprout::PointStyle) {
        self.0.push(format!("point {}", style.radius));
    }
    fn set_color(&mut self, color: Color) {
        self.0.push(format!("color {:06x}", color.to_hex()));
    }
    fn save_state(&mut self) -> Result<(), Self::Error> {
        self.0.push("saveState".into());
        Ok(())
    }
    fn restore_state(&mut self) -> Result<(), Self::Error> {
        self.0.push("restoreState".into());
        Ok(())
    }
}

#[test]
fn test_command_dispatch_order() {
    let source = "saveState; color #0000ff; turnDown 10; jump 2; sphere 3; restoreState; rotate 5";
    let cmd = compile(source).unwrap();
    let mut recorder = Recorder::default();
    cmd.execute(&mut recorder).unwrap();
    assert_eq!(
        recorder.0,
        [
            "saveState",
            "color 0000ff",
            "turnDown 10",
            "jump 2",
            "point 3",
            "restoreState",
            "rotate 5"
        ]
    );
}
