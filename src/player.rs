//! External player process management
//!
//! Playback is delegated to a player binary (ffplay by default) spawned as a
//! child process. This module only builds the command line and owns the
//! child handle; it never looks inside the stream.

use std::io::{BufRead, BufReader};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::Sender;
use std::thread;

use crate::catalog::Channel;

/// Launch settings the app passes through from its config.
pub struct PlaybackOptions {
    /// Player command; empty means ffplay
    pub command: String,
    /// 0..=100, applied at launch where the player has a volume flag
    pub volume: u8,
    /// Kill the previous player before spawning the next
    pub single_window: bool,
}

pub struct ExternalPlayer {
    current: Option<Child>,
}

impl ExternalPlayer {
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Spawn the configured player on a channel's URL.
    ///
    /// Returns the child PID, or a message suitable for the status bar when
    /// the spawn fails. Player stderr is streamed line by line to `log_tx`.
    pub fn play(
        &mut self,
        channel: &Channel,
        opts: &PlaybackOptions,
        log_tx: &Sender<String>,
    ) -> Result<u32, String> {
        if opts.single_window {
            self.stop();
        }

        let player = if opts.command.is_empty() {
            "ffplay".to_string()
        } else {
            opts.command.clone()
        };
        let player = resolve_player_binary(player);

        let mut cmd = Command::new(&player);
        build_args(&mut cmd, &player, channel, opts);

        cmd.stderr(Stdio::piped());
        cmd.stdout(Stdio::null());

        let mut child = cmd
            .spawn()
            .map_err(|e| format!("Failed to launch player '{}': {}", player, e))?;
        let pid = child.id();

        if let Some(stderr) = child.stderr.take() {
            let sender = log_tx.clone();
            thread::spawn(move || {
                let reader = BufReader::new(stderr);
                for line in reader.lines().map_while(Result::ok) {
                    if !line.trim().is_empty() {
                        let _ = sender.send(format!("[PLAYER] {}", line));
                    }
                }
            });
        }

        self.current = Some(child);
        Ok(pid)
    }

    /// Kill and reap the current player, if any.
    pub fn stop(&mut self) {
        if let Some(ref mut child) = self.current {
            let _ = child.kill();
            let _ = child.wait();
        }
        self.current = None;
    }

    /// True while the spawned player is still running.
    pub fn is_running(&mut self) -> bool {
        match self.current {
            Some(ref mut child) => match child.try_wait() {
                Ok(Some(_)) => {
                    self.current = None;
                    false
                }
                Ok(None) => true,
                Err(_) => false,
            },
            None => false,
        }
    }
}

impl Drop for ExternalPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Expand bare player names to known install paths on Windows.
#[cfg(target_os = "windows")]
fn resolve_player_binary(player: String) -> String {
    let lower = player.to_lowercase();

    let candidates: &[&str] = if lower == "vlc" || lower == "vlc.exe" {
        &[
            r"C:\Program Files\VideoLAN\VLC\vlc.exe",
            r"C:\Program Files (x86)\VideoLAN\VLC\vlc.exe",
        ]
    } else if lower == "mpv" || lower == "mpv.exe" {
        &[
            r"C:\Program Files\mpv\mpv.exe",
            r"C:\Program Files (x86)\mpv\mpv.exe",
            r"C:\mpv\mpv.exe",
        ]
    } else if lower == "ffplay" || lower == "ffplay.exe" {
        &[
            r"C:\ffmpeg\bin\ffplay.exe",
            r"C:\Program Files\ffmpeg\bin\ffplay.exe",
        ]
    } else {
        return player;
    };

    candidates
        .iter()
        .find(|path| std::path::Path::new(path).exists())
        .map(|s| s.to_string())
        .unwrap_or(player)
}

#[cfg(not(target_os = "windows"))]
fn resolve_player_binary(player: String) -> String {
    player
}

fn window_title(channel: &Channel) -> String {
    let stream_name = channel.url.split('/').next_back().unwrap_or("stream");
    format!("{} - {}", channel.name, stream_name)
}

fn build_args(cmd: &mut Command, player: &str, channel: &Channel, opts: &PlaybackOptions) {
    let player_lower = player.to_lowercase();

    if player_lower.contains("ffplay") {
        // ffplay takes its input directly, not with -i
        let mut args = vec![
            channel.url.clone(),
            "-autoexit".to_string(),
            "-sync".to_string(), "audio".to_string(),
            "-framedrop".to_string(),
            "-window_title".to_string(), window_title(channel),
            "-volume".to_string(), opts.volume.to_string(),
        ];
        if channel.url.starts_with("http") {
            args.extend([
                "-reconnect".to_string(), "1".to_string(),
                "-reconnect_streamed".to_string(), "1".to_string(),
                "-reconnect_delay_max".to_string(), "10".to_string(),
            ]);
        }
        cmd.args(args);
    } else if player_lower.contains("mpv") {
        cmd.args([
            channel.url.clone(),
            format!("--title={}", window_title(channel)),
            format!("--volume={}", opts.volume),
            "--cache=yes".to_string(),
            "--network-timeout=60".to_string(),
            "--stream-lavf-o=reconnect=1".to_string(),
            "--stream-lavf-o=reconnect_streamed=1".to_string(),
            "--keep-open=yes".to_string(),
            "--ytdl=no".to_string(),
        ]);
    } else if player_lower.contains("vlc") {
        // VLC exposes gain rather than a 0-100 volume flag; leave its default
        cmd.args([
            channel.url.clone(),
            format!("--meta-title={}", window_title(channel)),
            "--network-caching=3000".to_string(),
            "--live-caching=3000".to_string(),
            "--http-reconnect".to_string(),
        ]);
    } else {
        // Unknown player - just pass the URL
        cmd.arg(&channel.url);
    }
}
