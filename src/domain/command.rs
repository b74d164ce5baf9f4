//! Typed descriptions of the external ffmpeg/ffprobe invocations.
//!
//! Construction is pure: a [`MediaCommand`] is just a program name and an
//! argument list, built deterministically from its inputs. Nothing here
//! touches the filesystem or spawns a process, which keeps every command
//! testable without the tools installed.

use super::hls::{Variant, VARIANT_LADDER};
use std::path::Path;

/// Encoder used for every video rendition.
pub const VIDEO_CODEC: &str = "libx264";
/// Constant quality parameter shared by all renditions.
pub const VIDEO_CRF: &str = "23";
/// Encoder used for audio when the source carries an audio stream.
pub const AUDIO_CODEC: &str = "aac";
/// Fixed output sample rate in Hz.
pub const AUDIO_SAMPLE_RATE: &str = "48000";
/// Target segment duration in seconds.
pub const SEGMENT_SECONDS: &str = "6";
/// Fixed JPEG quality for thumbnail extraction (2 = high).
pub const THUMBNAIL_QUALITY: &str = "2";

/// An external command, ready to be serialized to a process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaCommand {
    pub program: &'static str,
    pub args: Vec<String>,
}

impl MediaCommand {
    pub fn new(program: &'static str) -> Self {
        Self {
            program,
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy().into_owned())
    }
}

/// Probe for audio streams: stream indices only, CSV output without
/// headers, so "has audio" reduces to "printed anything at all".
pub fn audio_probe_command(source: &Path) -> MediaCommand {
    MediaCommand::new("ffprobe")
        .arg("-v")
        .arg("error")
        .arg("-select_streams")
        .arg("a")
        .arg("-show_entries")
        .arg("stream=index")
        .arg("-of")
        .arg("csv=p=0")
        .path_arg(source)
}

/// The `split`/`scale` filter graph feeding one labelled output per
/// ladder variant: `[0:v]split=3[v0][v1][v2];[v0]scale=...[v0out];...`
fn scale_filter_graph(ladder: &[Variant]) -> String {
    let split_labels: String = (0..ladder.len()).map(|i| format!("[v{}]", i)).collect();
    let mut graph = format!("[0:v]split={}{}", ladder.len(), split_labels);
    for (i, variant) in ladder.iter().enumerate() {
        graph.push_str(&format!(
            ";[v{i}]scale=w={}:h={}[v{i}out]",
            variant.width, variant.height
        ));
    }
    graph
}

/// `-var_stream_map` value binding each output stream pair to a variant
/// name. With audio: `v:0,a:0,name:480p ...`; without: `v:0,name:480p ...`.
fn variant_stream_map(ladder: &[Variant], has_audio: bool) -> String {
    ladder
        .iter()
        .enumerate()
        .map(|(i, variant)| {
            if has_audio {
                format!("v:{i},a:{i},name:{}", variant.name)
            } else {
                format!("v:{i},name:{}", variant.name)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build the full multi-variant HLS encode.
///
/// One input is split into three scaled video streams; each is mapped into
/// its own named variant. When `has_audio` is set, every variant also maps
/// the first audio stream as optional (`a:0?`), so a map/stream mismatch
/// does not fail the whole encode, and fixed AAC encoding options are
/// added. Output is segmented VOD HLS with per-variant segment and
/// playlist names plus a master playlist referencing all variants.
pub fn hls_encode_command(source: &Path, hls_dir: &Path, has_audio: bool) -> MediaCommand {
    let mut cmd = MediaCommand::new("ffmpeg")
        .arg("-y")
        .arg("-i")
        .path_arg(source)
        .arg("-filter_complex")
        .arg(scale_filter_graph(&VARIANT_LADDER));

    for i in 0..VARIANT_LADDER.len() {
        cmd = cmd.arg("-map").arg(format!("[v{}out]", i));
        if has_audio {
            // Optional map: tolerate sources whose audio disappears
            // between probe and encode.
            cmd = cmd.arg("-map").arg("a:0?");
        }
    }

    cmd = cmd.arg("-c:v").arg(VIDEO_CODEC).arg("-crf").arg(VIDEO_CRF);

    if has_audio {
        cmd = cmd
            .arg("-c:a")
            .arg(AUDIO_CODEC)
            .arg("-ar")
            .arg(AUDIO_SAMPLE_RATE);
    }

    cmd.arg("-f")
        .arg("hls")
        .arg("-hls_time")
        .arg(SEGMENT_SECONDS)
        .arg("-hls_playlist_type")
        .arg("vod")
        .arg("-hls_segment_filename")
        .arg(format!("{}/%v/segment_%03d.ts", hls_dir.display()))
        .arg("-master_pl_name")
        .arg(super::hls::MASTER_PLAYLIST)
        .arg("-var_stream_map")
        .arg(variant_stream_map(&VARIANT_LADDER, has_audio))
        .arg(format!(
            "{}/%v/{}",
            hls_dir.display(),
            super::hls::VARIANT_PLAYLIST
        ))
}

/// Grab one still frame at the 1-second mark. Seeking past the first
/// frame avoids the black lead-in many encodes start with.
pub fn thumbnail_command(source: &Path, output: &Path) -> MediaCommand {
    MediaCommand::new("ffmpeg")
        .arg("-y")
        .arg("-ss")
        .arg("1")
        .arg("-i")
        .path_arg(source)
        .arg("-frames:v")
        .arg("1")
        .arg("-q:v")
        .arg(THUMBNAIL_QUALITY)
        .path_arg(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn has_flag_with_value(args: &[String], flag: &str, value: &str) -> bool {
        args.windows(2)
            .any(|pair| pair[0] == flag && pair[1] == value)
    }

    #[test]
    fn test_audio_probe_selects_audio_streams_csv() {
        let cmd = audio_probe_command(Path::new("/media/videos/clip.mp4"));

        assert_eq!(cmd.program, "ffprobe");
        assert!(has_flag_with_value(&cmd.args, "-select_streams", "a"));
        assert!(has_flag_with_value(&cmd.args, "-show_entries", "stream=index"));
        assert!(has_flag_with_value(&cmd.args, "-of", "csv=p=0"));
        assert_eq!(cmd.args.last().unwrap(), "/media/videos/clip.mp4");
    }

    #[test]
    fn test_scale_filter_graph_covers_ladder() {
        let graph = scale_filter_graph(&VARIANT_LADDER);
        assert_eq!(
            graph,
            "[0:v]split=3[v0][v1][v2]\
             ;[v0]scale=w=854:h=480[v0out]\
             ;[v1]scale=w=1280:h=720[v1out]\
             ;[v2]scale=w=1920:h=1080[v2out]"
        );
    }

    #[test]
    fn test_encode_without_audio_has_no_audio_options() {
        let cmd = hls_encode_command(
            Path::new("/media/videos/clip.mp4"),
            Path::new("/media/videos/clip_hls"),
            false,
        );

        assert!(!cmd.args.iter().any(|a| a == "-c:a"));
        assert!(!cmd.args.iter().any(|a| a == "-ar"));
        assert!(!cmd.args.iter().any(|a| a == "a:0?"));
        assert!(has_flag_with_value(
            &cmd.args,
            "-var_stream_map",
            "v:0,name:480p v:1,name:720p v:2,name:1080p"
        ));
        // Exactly the three scaled video streams are mapped
        let map_count = cmd.args.iter().filter(|a| *a == "-map").count();
        assert_eq!(map_count, 3);
    }

    #[test]
    fn test_encode_with_audio_maps_optional_audio_per_variant() {
        let cmd = hls_encode_command(
            Path::new("/media/videos/clip.mp4"),
            Path::new("/media/videos/clip_hls"),
            true,
        );

        assert!(has_flag_with_value(&cmd.args, "-c:a", AUDIO_CODEC));
        assert!(has_flag_with_value(&cmd.args, "-ar", AUDIO_SAMPLE_RATE));
        assert!(has_flag_with_value(
            &cmd.args,
            "-var_stream_map",
            "v:0,a:0,name:480p v:1,a:1,name:720p v:2,a:2,name:1080p"
        ));
        // Three video maps plus three optional audio maps
        let map_count = cmd.args.iter().filter(|a| *a == "-map").count();
        assert_eq!(map_count, 6);
        let optional_audio = cmd.args.iter().filter(|a| *a == "a:0?").count();
        assert_eq!(optional_audio, 3);
    }

    #[test]
    fn test_encode_output_layout_arguments() {
        let cmd = hls_encode_command(
            Path::new("/media/videos/clip.mp4"),
            Path::new("/media/videos/clip_hls"),
            true,
        );

        assert!(has_flag_with_value(&cmd.args, "-c:v", VIDEO_CODEC));
        assert!(has_flag_with_value(&cmd.args, "-crf", VIDEO_CRF));
        assert!(has_flag_with_value(&cmd.args, "-f", "hls"));
        assert!(has_flag_with_value(&cmd.args, "-hls_time", SEGMENT_SECONDS));
        assert!(has_flag_with_value(&cmd.args, "-hls_playlist_type", "vod"));
        assert!(has_flag_with_value(
            &cmd.args,
            "-hls_segment_filename",
            "/media/videos/clip_hls/%v/segment_%03d.ts"
        ));
        assert!(has_flag_with_value(&cmd.args, "-master_pl_name", "master.m3u8"));
        assert_eq!(
            cmd.args.last().unwrap(),
            "/media/videos/clip_hls/%v/playlist.m3u8"
        );
    }

    #[test]
    fn test_encode_command_is_deterministic() {
        let source = PathBuf::from("/media/videos/clip.mp4");
        let hls_dir = PathBuf::from("/media/videos/clip_hls");

        for has_audio in [false, true] {
            let first = hls_encode_command(&source, &hls_dir, has_audio);
            let second = hls_encode_command(&source, &hls_dir, has_audio);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_thumbnail_command_grabs_one_frame_at_one_second() {
        let cmd = thumbnail_command(
            Path::new("/media/videos/clip.mp4"),
            Path::new("/media/thumbnail/clip.jpg"),
        );

        assert_eq!(cmd.program, "ffmpeg");
        assert!(has_flag_with_value(&cmd.args, "-ss", "1"));
        assert!(has_flag_with_value(&cmd.args, "-frames:v", "1"));
        assert!(has_flag_with_value(&cmd.args, "-q:v", THUMBNAIL_QUALITY));
        assert_eq!(cmd.args.last().unwrap(), "/media/thumbnail/clip.jpg");
    }
}
