//! Canales - personal IPTV channel player
//! Keeps a searchable list of named stream URLs and plays the selected one
//! through an external player process or the embedded decoder.

// Hide console window on Windows release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

// Use mimalloc for faster memory allocation (Linux, macOS)
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use eframe::egui;
use std::sync::mpsc::{channel, Receiver, Sender};

mod catalog;
mod config;
mod embedded;
mod player;

#[cfg(test)]
mod catalog_tests;

use catalog::{resolve, Catalog, CatalogError};
use config::{channels_path, AppConfig};
use embedded::Screen;
use player::{ExternalPlayer, PlaybackOptions};

/// Get current time as HH:MM:SS (UTC)
fn timestamp_now() -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let secs = now % 86400;
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Window icon: teal tile with a white play triangle
fn load_icon() -> egui::IconData {
    let size: usize = 64;
    let mut rgba = vec![0u8; size * size * 4];

    for y in 0..size {
        for x in 0..size {
            let idx = (y * size + x) * 4;

            let nx = x as f32 / size as f32;
            let ny = y as f32 / size as f32;

            // Rounded corners
            let r = 0.14;
            let dx = if nx < r { r - nx } else if nx > 1.0 - r { nx - (1.0 - r) } else { 0.0 };
            let dy = if ny < r { r - ny } else if ny > 1.0 - r { ny - (1.0 - r) } else { 0.0 };
            if dx * dx + dy * dy > r * r {
                continue;
            }

            // Teal gradient background
            let t = (nx + ny) * 0.5;
            let (mut red, mut green, mut blue) = (
                (16.0 + 24.0 * t) as u8,
                (110.0 + 40.0 * t) as u8,
                (118.0 + 30.0 * t) as u8,
            );

            // Play triangle, centered
            let px = nx - 0.38;
            let py = ny - 0.5;
            if px >= 0.0 && px <= 0.3 && py.abs() <= (0.3 - px) * 0.6 {
                red = 245;
                green = 245;
                blue = 245;
            }

            rgba[idx] = red;
            rgba[idx + 1] = green;
            rgba[idx + 2] = blue;
            rgba[idx + 3] = 255;
        }
    }

    egui::IconData {
        rgba,
        width: size as u32,
        height: size as u32,
    }
}

fn main() -> Result<(), eframe::Error> {
    // Force X11 backend on Linux before any windowing code runs
    #[cfg(target_os = "linux")]
    {
        std::env::set_var("WINIT_UNIX_BACKEND", "x11");
        std::env::remove_var("WAYLAND_DISPLAY");
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 640.0])
            .with_min_inner_size([800.0, 480.0])
            .with_icon(load_icon()),
        vsync: true,
        hardware_acceleration: eframe::HardwareAcceleration::Preferred,
        ..Default::default()
    };

    eframe::run_native(
        "Canales",
        options,
        Box::new(|cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Ok(Box::new(CanalesApp::new()))
        }),
    )
}

struct CanalesApp {
    catalog: Catalog,
    config: AppConfig,

    // Search; selection is an index into the current filtered view
    search_query: String,
    selected: Option<usize>,

    // Add Channel dialog
    show_add_dialog: bool,
    name_input: String,
    url_input: String,
    add_error: Option<String>,

    // Playback
    external: ExternalPlayer,
    screen: Screen,
    now_playing: Option<String>,

    // Status & console
    status_message: String,
    console_log: Vec<String>,
    show_console: bool,

    // Player stderr arrives here from reader threads
    log_receiver: Receiver<String>,
    log_sender: Sender<String>,
}

impl Default for CanalesApp {
    fn default() -> Self {
        Self::new()
    }
}

impl CanalesApp {
    fn new() -> Self {
        let config = AppConfig::load();
        let (log_sender, log_receiver) = channel();

        let mut console_log = vec!["[INFO] Canales started".to_string()];
        let (catalog, status_message) = match Catalog::load(channels_path()) {
            Ok(catalog) => {
                let status = format!("{} channels loaded", catalog.len());
                (catalog, status)
            }
            Err(err @ CatalogError::StorageUnavailable(_)) => {
                console_log.push(format!("[WARN] {}", err));
                (
                    Catalog::empty(channels_path()),
                    "No saved channels yet - add one to get started".to_string(),
                )
            }
            Err(err) => {
                console_log.push(format!("[WARN] {}", err));
                (
                    Catalog::empty(channels_path()),
                    "Channel list could not be read - starting empty".to_string(),
                )
            }
        };

        Self {
            catalog,
            config,
            search_query: String::new(),
            selected: None,
            show_add_dialog: false,
            name_input: String::new(),
            url_input: String::new(),
            add_error: None,
            external: ExternalPlayer::new(),
            screen: Screen::new(),
            now_playing: None,
            status_message,
            console_log,
            show_console: false,
            log_receiver,
            log_sender,
        }
    }

    fn log(&mut self, message: &str) {
        let timestamp = timestamp_now();
        self.console_log.push(format!("[{}] {}", timestamp, message));
        // Keep last 500 lines
        if self.console_log.len() > 500 {
            self.console_log.remove(0);
        }
    }

    fn warn(&mut self, message: &str) {
        self.status_message = format!("⚠ {}", message);
        self.log(&format!("[WARN] {}", message));
    }

    fn submit_add_channel(&mut self) {
        let name = self.name_input.trim().to_string();
        let url = self.url_input.trim().to_string();

        match self.catalog.add(&name, &url) {
            Ok(()) => {
                self.log(&format!("[ADD] {} | {}", name, url));
                self.status_message = format!("Channel added: {}", name);
                self.add_error = None;
                self.name_input.clear();
                self.url_input.clear();
                self.show_add_dialog = false;
            }
            Err(err @ CatalogError::InvalidInput(_)) => {
                // Keep the dialog open so the input can be fixed
                self.add_error = Some(err.to_string());
            }
            Err(err @ CatalogError::StorageWrite { .. }) => {
                // The entry exists for this session; the file is stale
                self.warn(&err.to_string());
                self.add_error = None;
                self.name_input.clear();
                self.url_input.clear();
                self.show_add_dialog = false;
            }
            Err(err) => self.warn(&err.to_string()),
        }
    }

    fn play_selected(&mut self) {
        let view = self.catalog.filter(&self.search_query);

        let Some(index) = self.selected else {
            self.warn(&CatalogError::NoSelection.to_string());
            return;
        };
        let channel = match resolve(&view, index) {
            Ok(_) => view[index].clone(),
            Err(err) => {
                self.selected = None;
                self.warn(&err.to_string());
                return;
            }
        };

        self.log(&format!("[PLAY] {} | {}", channel.name, channel.url));

        if self.config.use_internal_player {
            self.external.stop();
            self.screen.player.set_volume(self.config.volume);
            self.screen.play(&channel.name, &channel.url);
            self.status_message = format!("Playing {}", channel.name);
        } else {
            self.screen.stop();
            let opts = PlaybackOptions {
                command: self.config.external_player.clone(),
                volume: self.config.volume,
                single_window: self.config.single_window_mode,
            };
            match self.external.play(&channel, &opts, &self.log_sender) {
                Ok(pid) => {
                    self.log(&format!("[PLAY] Player launched (PID: {})", pid));
                    self.status_message = format!("Playing {}", channel.name);
                }
                Err(e) => {
                    self.warn(&e);
                    return;
                }
            }
        }

        self.now_playing = Some(channel.name);
    }

    fn pause_playback(&mut self) {
        if self.screen.is_active() {
            self.screen.player.toggle_pause();
        } else if self.external.is_running() {
            self.status_message = "The external player window has its own pause control".to_string();
        } else {
            self.status_message = "Nothing is playing".to_string();
        }
    }

    fn stop_playback(&mut self) {
        let was_playing = self.screen.is_active() || self.external.is_running();
        self.screen.stop();
        self.external.stop();
        self.now_playing = None;
        if was_playing {
            self.log("[STOP] Playback stopped");
            self.status_message = "Stopped".to_string();
        }
    }

    fn browse_for_player(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .set_title("Select Media Player")
            .pick_file()
        {
            self.config.external_player = path.display().to_string();
            self.config.save();
        }
    }

    fn show_controls(&mut self, ui: &mut egui::Ui) {
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            if ui.button("➕ Add Channel").clicked() {
                self.show_add_dialog = true;
                self.add_error = None;
            }

            ui.separator();

            if ui.button("▶ Play").clicked() {
                self.play_selected();
            }
            if ui.button("⏸ Pause").clicked() {
                self.pause_playback();
            }
            if ui.button("⏹ Stop").clicked() {
                self.stop_playback();
            }

            ui.separator();

            let volume = ui
                .add(egui::Slider::new(&mut self.config.volume, 0..=100).text("🔊"))
                .on_hover_text("Volume for the embedded player; external players read it at launch");
            if volume.drag_stopped() || volume.lost_focus() {
                self.screen.player.set_volume(self.config.volume);
                self.config.save();
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.selectable_label(self.show_console, "🖥 Console").clicked() {
                    self.show_console = !self.show_console;
                }
                if ui.checkbox(&mut self.config.dark_mode, "🌙 Dark").changed() {
                    self.config.save();
                }
            });
        });

        ui.horizontal(|ui| {
            ui.label("🎬 Player:");
            let player_edit = ui
                .add(
                    egui::TextEdit::singleline(&mut self.config.external_player)
                        .hint_text("mpv, vlc, ffplay...")
                        .desired_width(220.0),
                )
                .on_hover_text("Media player command or path\nLeave empty for ffplay (default)");
            if player_edit.lost_focus() {
                self.config.save();
            }

            if ui.button("📁").on_hover_text("Browse for player executable").clicked() {
                self.browse_for_player();
            }

            ui.separator();

            if ui
                .checkbox(&mut self.config.single_window_mode, "Single Window")
                .on_hover_text("Close the previous player before starting a new stream")
                .changed()
            {
                self.config.save();
            }

            if ui
                .checkbox(&mut self.config.use_internal_player, "Embedded")
                .on_hover_text("Decode inside this window instead of spawning a player")
                .changed()
            {
                self.config.save();
            }
        });

        ui.add_space(5.0);
    }

    fn show_channel_list(&mut self, ui: &mut egui::Ui) {
        ui.add_space(5.0);
        ui.horizontal(|ui| {
            ui.label("🔍");
            ui.add(
                egui::TextEdit::singleline(&mut self.search_query)
                    .hint_text("Search...")
                    .desired_width(f32::INFINITY),
            );
        });

        // The visible list is always a fresh filter over the full catalog;
        // selection indices refer to this view
        let view = self.catalog.filter(&self.search_query);

        if let Some(sel) = self.selected {
            if sel >= view.len() {
                self.selected = None;
            }
        }

        ui.label(
            egui::RichText::new(format!("{} of {} channels", view.len(), self.catalog.len()))
                .weak(),
        );
        ui.separator();

        let mut to_play: Option<usize> = None;

        egui::ScrollArea::vertical().show(ui, |ui| {
            for (idx, channel) in view.iter().enumerate() {
                ui.horizontal(|ui| {
                    if ui.button("▶").clicked() {
                        to_play = Some(idx);
                    }
                    let row = ui
                        .selectable_label(self.selected == Some(idx), &channel.name)
                        .on_hover_text(&channel.url);
                    if row.clicked() {
                        self.selected = Some(idx);
                    }
                    if row.double_clicked() {
                        to_play = Some(idx);
                    }
                });
            }

            if view.is_empty() && !self.catalog.is_empty() {
                ui.label(egui::RichText::new("No channels match the search").weak());
            }
        });

        if let Some(idx) = to_play {
            self.selected = Some(idx);
            self.play_selected();
        }
    }

    fn show_add_channel_dialog(&mut self, ctx: &egui::Context) {
        if !self.show_add_dialog {
            return;
        }

        let mut open = true;
        let mut submit = false;
        egui::Window::new("➕ Add Channel")
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Name:");
                    ui.add(
                        egui::TextEdit::singleline(&mut self.name_input)
                            .hint_text("News Channel")
                            .desired_width(240.0),
                    );
                });
                ui.horizontal(|ui| {
                    ui.label("URL:");
                    ui.add(
                        egui::TextEdit::singleline(&mut self.url_input)
                            .hint_text("http://server.com/stream.m3u8")
                            .desired_width(240.0),
                    );
                });

                if let Some(ref error) = self.add_error {
                    ui.add_space(4.0);
                    ui.colored_label(egui::Color32::RED, error);
                }

                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Add").clicked() || ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        submit = true;
                    }
                    if ui.button("Cancel").clicked() {
                        self.show_add_dialog = false;
                        self.add_error = None;
                        self.name_input.clear();
                        self.url_input.clear();
                    }
                });
            });

        if submit {
            self.submit_add_channel();
        }
        if !open {
            self.show_add_dialog = false;
            self.add_error = None;
        }
    }

    fn show_console_window(&mut self, ctx: &egui::Context) {
        if !self.show_console {
            return;
        }

        let mut open = true;
        egui::Window::new("🖥 Console")
            .default_size([560.0, 300.0])
            .open(&mut open)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    if ui.button("Clear").clicked() {
                        self.console_log.clear();
                    }
                    ui.label(format!("{} lines", self.console_log.len()));
                });
                ui.separator();
                egui::ScrollArea::vertical()
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        for line in &self.console_log {
                            ui.label(egui::RichText::new(line).monospace().size(11.0));
                        }
                    });
            });
        self.show_console = open;
    }
}

impl eframe::App for CanalesApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Drain player stderr into the console
        while let Ok(line) = self.log_receiver.try_recv() {
            self.log(&line);
        }

        if self.config.dark_mode {
            ctx.set_visuals(egui::Visuals::dark());
        } else {
            ctx.set_visuals(egui::Visuals::light());
        }

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            self.show_controls(ui);
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.status_message);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if let Some(ref name) = self.now_playing {
                        ui.label(egui::RichText::new(format!("📺 {}", name)).strong());
                    }
                });
            });
        });

        egui::SidePanel::left("channels")
            .default_width(300.0)
            .min_width(220.0)
            .show(ctx, |ui| {
                self.show_channel_list(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            if !self.screen.is_active() && self.external.is_running() {
                ui.vertical_centered(|ui| {
                    ui.add_space(60.0);
                    if let Some(ref name) = self.now_playing {
                        ui.label(format!("▶ {}", name));
                    }
                    ui.label(egui::RichText::new("Playing in the external player window").weak());
                });
            } else {
                self.screen.show(ctx, ui);
            }
        });

        self.show_add_channel_dialog(ctx);
        self.show_console_window(ctx);
    }
}
