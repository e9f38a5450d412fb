// Embedded playback using ffmpeg-next, behind the `internal-player` feature.
// Requires FFmpeg libraries: libavcodec, libavformat, libavutil, libswscale
//
// To install FFmpeg development libraries:
// - Ubuntu/Debian: sudo apt install libavcodec-dev libavformat-dev libavutil-dev libswscale-dev
// - Fedora: sudo dnf install ffmpeg-devel
// - macOS: brew install ffmpeg
// - Windows: Download from https://ffmpeg.org and set FFMPEG_DIR environment variable

#[cfg(feature = "internal-player")]
mod backend {
    use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::{Duration, Instant};

    extern crate ffmpeg_next as ffmpeg;
    use ffmpeg::format::Pixel;
    use ffmpeg::media::Type;
    use ffmpeg::software::scaling::{context::Context as ScalingContext, flag::Flags};
    use ffmpeg::util::frame::video::Video;

    #[derive(Debug, Clone, PartialEq)]
    pub enum PlaybackState {
        Stopped,
        Loading,
        Playing,
        Paused,
        Error(String),
    }

    /// One decoded frame, RGB24, ready for the UI thread
    pub struct RgbFrame {
        pub width: u32,
        pub height: u32,
        pub data: Vec<u8>,
    }

    enum Control {
        Stop,
        Pause,
        Resume,
    }

    pub struct EmbeddedPlayer {
        state: Arc<Mutex<PlaybackState>>,
        frame_slot: Arc<Mutex<Option<RgbFrame>>>,
        control_tx: Option<Sender<Control>>,
        channel_name: String,
        volume: u8,
    }

    impl EmbeddedPlayer {
        pub fn new() -> Self {
            ffmpeg::init().ok();

            Self {
                state: Arc::new(Mutex::new(PlaybackState::Stopped)),
                frame_slot: Arc::new(Mutex::new(None)),
                control_tx: None,
                channel_name: String::new(),
                volume: 50,
            }
        }

        pub fn state(&self) -> PlaybackState {
            self.state.lock().unwrap().clone()
        }

        pub fn take_frame(&self) -> Option<RgbFrame> {
            self.frame_slot.lock().unwrap().take()
        }

        pub fn channel_name(&self) -> &str {
            &self.channel_name
        }

        /// Start decoding a stream URL on a background thread.
        pub fn play(&mut self, name: &str, url: &str) {
            self.stop();
            self.channel_name = name.to_string();
            *self.state.lock().unwrap() = PlaybackState::Loading;

            let (control_tx, control_rx) = channel();
            self.control_tx = Some(control_tx);

            let url = url.to_string();
            let state = Arc::clone(&self.state);
            let frame_slot = Arc::clone(&self.frame_slot);

            thread::spawn(move || {
                let outcome = run_decode_loop(&url, &state, &frame_slot, &control_rx);
                *state.lock().unwrap() = match outcome {
                    Ok(()) => PlaybackState::Stopped,
                    Err(message) => PlaybackState::Error(message),
                };
            });
        }

        pub fn stop(&mut self) {
            if let Some(ref tx) = self.control_tx {
                let _ = tx.send(Control::Stop);
            }
            self.control_tx = None;
            *self.state.lock().unwrap() = PlaybackState::Stopped;
            *self.frame_slot.lock().unwrap() = None;
        }

        pub fn toggle_pause(&mut self) {
            let Some(ref tx) = self.control_tx else { return };
            match self.state() {
                PlaybackState::Playing => {
                    let _ = tx.send(Control::Pause);
                }
                PlaybackState::Paused => {
                    let _ = tx.send(Control::Resume);
                }
                _ => {}
            }
        }

        pub fn set_volume(&mut self, volume: u8) {
            self.volume = volume.min(100);
        }

        pub fn volume(&self) -> u8 {
            self.volume
        }
    }

    impl Drop for EmbeddedPlayer {
        fn drop(&mut self) {
            self.stop();
        }
    }

    /// Decode video packets until stopped or the stream ends, publishing RGB
    /// frames into the shared slot at display rate.
    fn run_decode_loop(
        url: &str,
        state: &Arc<Mutex<PlaybackState>>,
        frame_slot: &Arc<Mutex<Option<RgbFrame>>>,
        control_rx: &Receiver<Control>,
    ) -> Result<(), String> {
        let mut options = ffmpeg::Dictionary::new();
        options.set("reconnect", "1");
        options.set("reconnect_streamed", "1");
        options.set("reconnect_delay_max", "5");
        options.set("timeout", "5000000");

        let mut input = ffmpeg::format::input_with_dictionary(&url, options)
            .map_err(|e| format!("Failed to open stream: {}", e))?;

        let stream = input
            .streams()
            .best(Type::Video)
            .ok_or_else(|| "No video stream found".to_string())?;
        let stream_index = stream.index();

        let decoder_context = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
            .map_err(|e| format!("Failed to read codec parameters: {}", e))?;
        let mut decoder = decoder_context
            .decoder()
            .video()
            .map_err(|e| format!("Failed to create decoder: {}", e))?;

        let (src_w, src_h) = (decoder.width(), decoder.height());
        let (dst_w, dst_h) = display_size(src_w, src_h);

        let mut scaler = ScalingContext::get(
            decoder.format(),
            src_w,
            src_h,
            Pixel::RGB24,
            dst_w,
            dst_h,
            Flags::BILINEAR,
        )
        .map_err(|e| format!("Failed to create scaler: {}", e))?;

        *state.lock().unwrap() = PlaybackState::Playing;

        let mut paused = false;
        let frame_interval = Duration::from_secs_f64(1.0 / 30.0);
        let mut last_publish = Instant::now();

        for (packet_stream, packet) in input.packets() {
            match control_rx.try_recv() {
                Ok(Control::Stop) => return Ok(()),
                Ok(Control::Pause) => {
                    paused = true;
                    *state.lock().unwrap() = PlaybackState::Paused;
                }
                Ok(Control::Resume) => {
                    paused = false;
                    *state.lock().unwrap() = PlaybackState::Playing;
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => return Ok(()),
            }

            if paused {
                thread::sleep(Duration::from_millis(50));
                continue;
            }

            if packet_stream.index() != stream_index {
                continue;
            }

            if decoder.send_packet(&packet).is_err() {
                continue;
            }

            let mut decoded = Video::empty();
            while decoder.receive_frame(&mut decoded).is_ok() {
                let mut rgb = Video::empty();
                if scaler.run(&decoded, &mut rgb).is_err() {
                    continue;
                }

                *frame_slot.lock().unwrap() = Some(copy_frame(&rgb, dst_w, dst_h));

                // Pace publishing so the UI thread is not flooded
                let elapsed = last_publish.elapsed();
                if elapsed < frame_interval {
                    thread::sleep(frame_interval - elapsed);
                }
                last_publish = Instant::now();
            }
        }

        Ok(())
    }

    /// Cap oversized streams at 720p for display
    fn display_size(width: u32, height: u32) -> (u32, u32) {
        if width > 1280 || height > 720 {
            let scale = f64::min(1280.0 / width as f64, 720.0 / height as f64);
            ((width as f64 * scale) as u32, (height as f64 * scale) as u32)
        } else {
            (width, height)
        }
    }

    /// Copy out the RGB24 plane, dropping per-row stride padding
    fn copy_frame(frame: &Video, width: u32, height: u32) -> RgbFrame {
        let plane = frame.data(0);
        let stride = frame.stride(0);
        let row_bytes = width as usize * 3;

        let mut data = Vec::with_capacity(row_bytes * height as usize);
        for y in 0..height as usize {
            let start = y * stride;
            data.extend_from_slice(&plane[start..start + row_bytes]);
        }

        RgbFrame {
            width,
            height,
            data,
        }
    }
}

// Stub when the internal-player feature is disabled
#[cfg(not(feature = "internal-player"))]
mod backend {
    #[derive(Debug, Clone, PartialEq)]
    pub enum PlaybackState {
        Stopped,
        Loading,
        Playing,
        Paused,
        Error(String),
    }

    pub struct RgbFrame {
        pub width: u32,
        pub height: u32,
        pub data: Vec<u8>,
    }

    pub struct EmbeddedPlayer {
        state: PlaybackState,
        channel_name: String,
        volume: u8,
    }

    impl EmbeddedPlayer {
        pub fn new() -> Self {
            Self {
                state: PlaybackState::Stopped,
                channel_name: String::new(),
                volume: 50,
            }
        }

        pub fn state(&self) -> PlaybackState {
            self.state.clone()
        }

        pub fn take_frame(&self) -> Option<RgbFrame> {
            None
        }

        pub fn channel_name(&self) -> &str {
            &self.channel_name
        }

        pub fn play(&mut self, name: &str, _url: &str) {
            self.channel_name = name.to_string();
            self.state = PlaybackState::Error(
                "Embedded player not enabled. Build with --features internal-player".to_string(),
            );
        }

        pub fn stop(&mut self) {
            self.state = PlaybackState::Stopped;
        }

        pub fn toggle_pause(&mut self) {}

        pub fn set_volume(&mut self, volume: u8) {
            self.volume = volume.min(100);
        }

        pub fn volume(&self) -> u8 {
            self.volume
        }
    }
}

pub use backend::{EmbeddedPlayer, PlaybackState};

/// The in-window video area: owns the embedded player and renders its frames
/// into an egui texture.
pub struct Screen {
    pub player: EmbeddedPlayer,
    texture: Option<egui::TextureHandle>,
}

impl Screen {
    pub fn new() -> Self {
        Self {
            player: EmbeddedPlayer::new(),
            texture: None,
        }
    }

    pub fn play(&mut self, name: &str, url: &str) {
        self.texture = None;
        self.player.play(name, url);
    }

    pub fn stop(&mut self) {
        self.player.stop();
        self.texture = None;
    }

    pub fn is_active(&self) -> bool {
        matches!(
            self.player.state(),
            PlaybackState::Playing | PlaybackState::Loading | PlaybackState::Paused
        )
    }

    /// Render the video (or playback status) into the given area.
    pub fn show(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        if let Some(frame) = self.player.take_frame() {
            let image = egui::ColorImage::from_rgb(
                [frame.width as usize, frame.height as usize],
                &frame.data,
            );
            self.texture = Some(ctx.load_texture("video_frame", image, egui::TextureOptions::LINEAR));
        }

        ui.vertical_centered(|ui| {
            if let Some(ref texture) = self.texture {
                let available = ui.available_size();
                let tex_size = texture.size_vec2();
                let aspect = tex_size.x / tex_size.y;

                let (width, height) = if available.x / available.y > aspect {
                    (available.y * aspect * 0.95, available.y * 0.95)
                } else {
                    (available.x * 0.95, available.x / aspect * 0.95)
                };

                ui.image((texture.id(), egui::vec2(width, height)));
            } else {
                ui.add_space(60.0);
                match self.player.state() {
                    PlaybackState::Loading => {
                        ui.spinner();
                        ui.label("Connecting to stream...");
                    }
                    PlaybackState::Error(ref e) => {
                        ui.colored_label(egui::Color32::RED, e);
                    }
                    _ => {
                        ui.label(egui::RichText::new("No channel playing").weak());
                    }
                }
            }

            if matches!(self.player.state(), PlaybackState::Paused) {
                ui.add_space(5.0);
                ui.label("⏸ Paused");
            }
        });

        if self.is_active() {
            ui.separator();
            ui.horizontal(|ui| {
                ui.label(self.player.channel_name());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("🔊 {}%", self.player.volume()));
                });
            });
        }

        // Keep frames flowing while the decoder is running
        if matches!(
            self.player.state(),
            PlaybackState::Playing | PlaybackState::Loading
        ) {
            ctx.request_repaint();
        }
    }
}
