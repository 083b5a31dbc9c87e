use eframe::egui::{self, Color32, RichText};
use scribble_lang::{Color, DrawCommand, Runtime, Shape, compile};

const MAX_LOG_LINES: usize = 500;

fn main() -> eframe::Result {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1400.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native("Scribble Dev", options, Box::new(|_cc| Ok(Box::new(App::default()))))
}

// ─── App state ────────────────────────────────────────────────────────────────

#[derive(PartialEq)]
enum Tab {
    Errors,
    Output,
    Ast,
    Canvas,
}

struct App {
    source: String,
    ast: String,
    runtime: Runtime,
    frame: Vec<DrawCommand>,
    errors: Vec<String>,
    printed: Vec<String>,
    tab: Tab,
}

impl Default for App {
    fn default() -> Self {
        let source = String::from(
            "# arrow keys move the ball
CanvasSize = (500, 500)
x = 250
y = 250

function run():
    color(240, 240, 240)
    rectangle(0, 0, width, height)
    popColor()
    color(30, 120, 220)
    circle(x, y, 24)
    popColor()
    if keyDown(\"left\"):
        x = x - 4
    if keyDown(\"right\"):
        x = x + 4
    if keyDown(\"up\"):
        y = y - 4
    if keyDown(\"down\"):
        y = y + 4
",
        );
        let mut app = Self {
            source,
            ast: String::new(),
            runtime: Runtime::new(&compile("")),
            frame: Vec::new(),
            errors: Vec::new(),
            printed: Vec::new(),
            tab: Tab::Canvas,
        };
        app.rebuild();
        app
    }
}

impl App {
    /// Compile the editor contents and replace the live runtime. All per-run
    /// state (globals, colors, logs) starts fresh.
    fn rebuild(&mut self) {
        let program = compile(&self.source);
        self.ast = format!("{program:#?}");
        self.runtime = Runtime::new(&program);
        self.frame.clear();
        self.errors.clear();
        self.printed.clear();
        self.drain_runtime_output();
    }

    /// Move diagnostics and print output out of the runtime into the UI logs.
    fn drain_runtime_output(&mut self) {
        for line in self.runtime.take_printed() {
            push_capped(&mut self.printed, line);
        }
        for diag in self.runtime.take_diagnostics() {
            let msg = diag.to_string();
            // scripts report the same fault every frame; collapse repeats
            if self.errors.last() != Some(&msg) {
                push_capped(&mut self.errors, msg);
            }
        }
    }
}

fn push_capped(log: &mut Vec<String>, line: String) {
    log.push(line);
    if log.len() > MAX_LOG_LINES {
        log.remove(0);
    }
}

/// Key names as scripts see them in `keyDown("...")`.
fn key_name(key: egui::Key) -> String {
    match key {
        egui::Key::ArrowLeft => "left".into(),
        egui::Key::ArrowRight => "right".into(),
        egui::Key::ArrowUp => "up".into(),
        egui::Key::ArrowDown => "down".into(),
        egui::Key::Space => "space".into(),
        other => format!("{other:?}").to_lowercase(),
    }
}

// ─── UI ───────────────────────────────────────────────────────────────────────

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ── Forward keyboard state ────────────────────────────────────────────
        ctx.input(|i| {
            for event in &i.events {
                if let egui::Event::Key { key, pressed, repeat, .. } = event {
                    if *repeat {
                        continue;
                    }
                    let name = key_name(*key);
                    if *pressed {
                        self.runtime.key_down(&name);
                    } else {
                        self.runtime.key_up(&name);
                    }
                }
            }
        });

        // ── Tick runtime every frame ──────────────────────────────────────────
        if self.runtime.is_running() {
            self.frame = self.runtime.tick();
            self.drain_runtime_output();
            ctx.request_repaint();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.columns(2, |cols| {
                // ── Left: editor ──────────────────────────────────────────────
                cols[0].vertical(|ui| {
                    ui.horizontal(|ui| {
                        ui.label("Source");
                        ui.separator();
                        for (label, snippet) in SNIPPETS {
                            if ui.small_button(*label).clicked() {
                                if !self.source.ends_with('\n') && !self.source.is_empty() {
                                    self.source.push('\n');
                                }
                                self.source.push_str(snippet);
                                self.rebuild();
                            }
                        }
                    });
                    let response = ui.add(
                        egui::TextEdit::multiline(&mut self.source)
                            .font(egui::TextStyle::Monospace)
                            .desired_width(f32::INFINITY)
                            .desired_rows(44),
                    );
                    if response.changed() {
                        self.rebuild();
                    }
                });

                // ── Right: output ─────────────────────────────────────────────
                cols[1].vertical(|ui| {
                    // ── Status bar ────────────────────────────────────────────
                    ui.horizontal(|ui| {
                        if self.runtime.is_running() {
                            ui.label(
                                RichText::new("●  running").color(Color32::from_rgb(80, 200, 80)),
                            );
                        } else {
                            ui.label(
                                RichText::new("■  stopped").color(Color32::from_rgb(160, 160, 160)),
                            );
                        }
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("run").clicked() {
                                self.rebuild();
                            }
                            if ui.button("stop").clicked() {
                                self.runtime.stop();
                            }
                        });
                    });

                    ui.separator();

                    // ── Tab bar ───────────────────────────────────────────────
                    ui.horizontal(|ui| {
                        let err_label = if self.errors.is_empty() {
                            "Errors".into()
                        } else {
                            format!("Errors ({})", self.errors.len())
                        };
                        ui.selectable_value(&mut self.tab, Tab::Errors, err_label);
                        ui.selectable_value(&mut self.tab, Tab::Output, "Output");
                        ui.selectable_value(&mut self.tab, Tab::Ast, "AST");
                        ui.selectable_value(&mut self.tab, Tab::Canvas, "Canvas");
                    });

                    ui.separator();

                    // ── Tab content ───────────────────────────────────────────
                    egui::ScrollArea::vertical().show(ui, |ui| match self.tab {
                        Tab::Errors => self.show_errors(ui),
                        Tab::Output => self.show_output(ui),
                        Tab::Ast => self.show_ast(ui),
                        Tab::Canvas => self.show_canvas(ui),
                    });
                });
            });
        });
    }
}

impl App {
    fn show_errors(&self, ui: &mut egui::Ui) {
        if self.errors.is_empty() {
            ui.label(RichText::new("No errors.").color(Color32::GRAY));
            return;
        }
        for msg in &self.errors {
            ui.label(RichText::new(msg).monospace().color(Color32::from_rgb(220, 80, 80)));
        }
    }

    fn show_output(&self, ui: &mut egui::Ui) {
        if self.printed.is_empty() {
            ui.label(RichText::new("No output — add print(...)").color(Color32::GRAY));
            return;
        }
        for line in &self.printed {
            ui.label(RichText::new(line).monospace());
        }
    }

    fn show_ast(&self, ui: &mut egui::Ui) {
        ui.add(
            egui::TextEdit::multiline(&mut self.ast.clone())
                .font(egui::TextStyle::Monospace)
                .desired_width(f32::INFINITY)
                .interactive(false),
        );
    }

    fn show_canvas(&self, ui: &mut egui::Ui) {
        let (w, h) = self.runtime.canvas_size();
        let desired = egui::vec2(w.max(1.0) as f32, h.max(1.0) as f32);
        let (canvas_rect, _response) = ui.allocate_exact_size(desired, egui::Sense::hover());
        let painter = ui.painter_at(canvas_rect);

        // Background
        painter.rect_filled(canvas_rect, 0.0, Color32::WHITE);

        // Shapes are in canvas pixel space (top-left origin, y-down); offset
        // by the allocated rect so they land where egui put the canvas.
        let offset = canvas_rect.min;
        for cmd in &self.frame {
            let fill = to_color32(cmd.color);
            match cmd.shape {
                Shape::Circle { x, y, radius } => {
                    painter.circle_filled(
                        egui::pos2(offset.x + x as f32, offset.y + y as f32),
                        radius.max(0.0) as f32,
                        fill,
                    );
                }
                Shape::Rect { x, y, width, height } => {
                    let rect = egui::Rect::from_min_size(
                        egui::pos2(offset.x + x as f32, offset.y + y as f32),
                        egui::vec2(width.max(0.0) as f32, height.max(0.0) as f32),
                    );
                    painter.rect_filled(rect, 0.0, fill);
                }
            }
        }
    }
}

fn to_color32(c: Color) -> Color32 {
    Color32::from_rgb(c.r, c.g, c.b)
}

/// Click-to-insert starting points for common statements.
const SNIPPETS: &[(&str, &str)] = &[
    ("circle", "circle(250, 250, 20)\n"),
    ("rectangle", "rectangle(100, 100, 80, 50)\n"),
    ("color", "color(255, 0, 0)\n"),
    ("loop", "loop i=10 times:\n    circle(i * 20, 250, 8)\n"),
    ("if", "if keyDown(\"space\"):\n    circle(250, 250, 40)\n"),
    ("function", "function run():\n    circle(250, 250, 20)\n"),
];
