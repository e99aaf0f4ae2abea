mod common;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use dpi::PhysicalSize;
use parking_lot::Mutex;
use threaded_video::{
    FontRenderApi, FrameRef, ShaderType, TextureImage, ThreadConfig, ThreadedVideo, VideoDriver,
    VideoError, VideoInfo,
};

use common::{DriverLog, MockDriver, MockOptions, spawn_mock, spawn_mock_with, wait_for};

const SETTLE: Duration = Duration::from_secs(5);

fn frame_bytes(width: u32, height: u32, fill: u8) -> Vec<u8> {
    vec![fill; (width * height * 4) as usize]
}

fn submit(video: &ThreadedVideo, width: u32, height: u32, fill: u8) -> bool {
    video.draw_frame(
        Some(&frame_bytes(width, height, fill)),
        width,
        height,
        (width * 4) as usize,
        None,
    )
}

fn wait_rendered(video: &ThreadedVideo, count: u64) {
    assert!(
        wait_for(SETTLE, || video.frame_stats().rendered >= count),
        "render thread did not draw {count} frames"
    );
}

#[test_log::test]
fn blocking_frames_render_in_order_without_misses() {
    let (video, log) = spawn_mock(
        VideoInfo::default(),
        MockOptions {
            draw_delay: Duration::from_millis(20),
            ..MockOptions::default()
        },
    );

    assert!(submit(&video, 640, 480, 1));
    assert!(submit(&video, 800, 600, 2));
    assert!(submit(&video, 640, 480, 3));
    wait_rendered(&video, 3);

    let drawn: Vec<_> = log
        .lock()
        .frames
        .iter()
        .map(|frame| (frame.width, frame.height, frame.first_byte))
        .collect();
    assert_eq!(
        drawn,
        vec![
            (640, 480, Some(1)),
            (800, 600, Some(2)),
            (640, 480, Some(3)),
        ]
    );

    let stats = video.frame_stats();
    assert_eq!(stats.frames, 3);
    assert_eq!(stats.hits, 3);
    assert_eq!(stats.misses, 0);
    assert_eq!(stats.last_rendered, 3);
}

#[test_log::test]
fn nonblocking_burst_counts_every_frame_and_renders_the_last() {
    let info = VideoInfo {
        adaptive_vsync: true,
        swap_interval: 2,
        ..VideoInfo::default()
    };
    let (video, log) = spawn_mock(
        info,
        MockOptions {
            draw_delay: Duration::from_millis(5),
            ..MockOptions::default()
        },
    );

    video.set_nonblock_state(true);
    for fill in 1..=100u8 {
        assert!(submit(&video, 4, 4, fill));
    }
    assert!(wait_for(SETTLE, || video.frame_stats().last_rendered == 100));

    let stats = video.frame_stats();
    assert_eq!(stats.frames, 100);
    assert_eq!(stats.hits + stats.misses, 100);

    let log = log.lock();
    let last = log.frames.last().expect("at least one frame drawn");
    assert_eq!(last.first_byte, Some(100));
    assert_eq!(last.frame_count, 100);
    assert!(
        log.frames
            .windows(2)
            .all(|pair| pair[0].frame_count < pair[1].frame_count)
    );
    assert_eq!(log.nonblock, vec![(true, true, 2)]);
}

#[test_log::test]
fn shader_changes_are_applied_one_at_a_time_in_issue_order() {
    let (video, log) = spawn_mock(
        VideoInfo::default(),
        MockOptions {
            shader_delay: Duration::from_millis(10),
            ..MockOptions::default()
        },
    );

    assert!(video.set_shader(ShaderType::Glsl, Some(Path::new("a.shader"))));
    assert_eq!(log.lock().shaders.len(), 1);
    assert!(video.set_shader(ShaderType::Glsl, Some(Path::new("b.shader"))));
    assert!(!video.set_shader(ShaderType::None, None));

    assert_eq!(
        log.lock().shaders,
        vec![
            Some(PathBuf::from("a.shader")),
            Some(PathBuf::from("b.shader")),
            None,
        ]
    );
}

#[test_log::test]
fn viewport_read_back_matches_last_set_viewport() {
    let (video, _log) = spawn_mock(VideoInfo::default(), MockOptions::default());
    assert_eq!(video.viewport_info().size(), PhysicalSize::new(640, 480));

    video.set_viewport(320, 240, false, false);
    assert_eq!(video.viewport_info().size(), PhysicalSize::new(320, 240));

    assert!(submit(&video, 320, 240, 0));
    wait_rendered(&video, 1);

    let mut buffer = vec![0u8; 320 * 240 * 3];
    assert!(video.read_viewport(&mut buffer));
    assert!(buffer.iter().all(|&byte| byte == 0xAB));
    assert_eq!(video.last_read_viewport().size(), PhysicalSize::new(320, 240));

    let mut short = vec![0u8; 16];
    assert!(!video.read_viewport(&mut short));
}

#[test_log::test]
fn calls_after_free_fail_without_blocking() {
    let (video, log) = spawn_mock(VideoInfo::default(), MockOptions::default());
    assert!(video.alive());

    video.free();
    assert_eq!(log.lock().dropped_on.as_deref(), Some("video"));

    let started = Instant::now();
    for _ in 0..100 {
        assert!(!video.alive());
        assert!(!submit(&video, 4, 4, 1));
        assert!(!video.set_shader(ShaderType::Slang, Some(Path::new("a.slangp"))));
        assert!(!video.get_fbo_state());
        assert!(!video.overlay_enable(true));
        assert!(!video.read_viewport(&mut [0u8; 16]));
        assert_eq!(video.custom_command(|_| 1), None);
        video.set_viewport(10, 10, false, false);
    }
    assert!(started.elapsed() < Duration::from_secs(2));

    video.free();
}

#[test_log::test]
fn init_failure_is_reported_and_leaves_no_thread() {
    let token = Arc::new(());
    let held = token.clone();

    let result = ThreadedVideo::new(
        VideoInfo::default(),
        ThreadConfig::default(),
        move |_: &VideoInfo| -> Result<MockDriver, String> {
            let _held = held;
            Err("no display available".to_string())
        },
    );

    match result {
        Err(VideoError::InitFailed(message)) => assert_eq!(message, "no display available"),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("init should fail"),
    }
    assert_eq!(Arc::strong_count(&token), 1);
}

#[test_log::test]
fn alive_is_answered_while_idle_and_draws_resume_after() {
    let (video, log) = spawn_mock(VideoInfo::default(), MockOptions::default());

    video.set_idle(true);
    assert!(video.is_idle());
    assert!(video.alive());

    assert!(submit(&video, 4, 4, 9));
    assert!(submit(&video, 4, 4, 10));
    thread::sleep(Duration::from_millis(50));
    assert!(log.lock().frames.is_empty());

    video.set_idle(false);
    wait_rendered(&video, 1);
    assert_eq!(log.lock().frames[0].first_byte, Some(10));
}

#[test_log::test]
fn dupe_frame_reuses_pixels_with_new_message() {
    let (video, log) = spawn_mock(VideoInfo::default(), MockOptions::default());

    assert!(submit(&video, 2, 2, 7));
    wait_rendered(&video, 1);
    assert!(video.draw_frame(None, 2, 2, 8, Some("paused")));
    wait_rendered(&video, 2);

    let log = log.lock();
    assert_eq!(log.frames[0].msg, None);
    assert_eq!(log.frames[1].first_byte, Some(7));
    assert_eq!(log.frames[1].msg.as_deref(), Some("paused"));
}

#[test_log::test]
fn custom_command_runs_on_render_thread_and_returns_result() {
    let (video, _log) = spawn_mock(VideoInfo::default(), MockOptions::default());

    let ident = video.custom_command(|driver| driver.ident().to_string());
    assert_eq!(ident.as_deref(), Some("mock"));

    let thread_name = video.custom_command(|_| thread::current().name().map(str::to_owned));
    assert_eq!(thread_name, Some(Some("video".to_string())));

    let failed: Option<Result<(), String>> =
        video.custom_command(|_| Err("extension failed".to_string()));
    assert_eq!(failed, Some(Err("extension failed".to_string())));
}

#[test_log::test]
fn font_init_sees_threaded_request() {
    let (video, _log) = spawn_mock(VideoInfo::default(), MockOptions::default());

    let font = video.font_init(
        Some(Path::new("font.ttf")),
        12.0,
        FontRenderApi::Vulkan,
        |driver, request| {
            request.is_threaded.then(|| {
                (
                    driver.ident().to_string(),
                    request.path.clone(),
                    request.size,
                    request.api,
                )
            })
        },
    );
    assert_eq!(
        font,
        Some((
            "mock".to_string(),
            Some(PathBuf::from("font.ttf")),
            12.0,
            FontRenderApi::Vulkan,
        ))
    );

    let missing: Option<u32> = video.font_init(None, 12.0, FontRenderApi::Gl, |_, _| None);
    assert_eq!(missing, None);
}

#[test_log::test]
fn overlay_alpha_is_picked_up_before_draw() {
    let (video, log) = spawn_mock(VideoInfo::default(), MockOptions::default());
    assert!(video.has_overlay());

    let image = TextureImage {
        pixels: vec![0; 4],
        size: PhysicalSize::new(2, 2),
    };
    assert!(video.overlay_load(&[image.clone(), image]));
    assert_eq!(log.lock().overlays_loaded, 2);

    assert!(video.overlay_set_alpha(1, 0.5));
    assert!(!video.overlay_set_alpha(2, 0.5));
    assert!(log.lock().alpha.is_empty());

    assert!(submit(&video, 2, 2, 1));
    wait_rendered(&video, 1);
    assert_eq!(log.lock().alpha, vec![(0, 1.0), (1, 0.5)]);
}

#[test_log::test]
fn menu_texture_and_state_changes_are_applied_before_draw() {
    let (video, log) = spawn_mock(VideoInfo::default(), MockOptions::default());

    video.set_texture_frame(&[9; 16], true, 2, 2, 0.75);
    video.set_texture_enable(true, false);
    video.apply_state_changes();
    video.set_aspect_ratio(3);
    video.set_hdr_contrast(5.0);
    video.set_fbo_state(true);
    assert!(video.get_fbo_state());

    assert!(submit(&video, 2, 2, 1));
    wait_rendered(&video, 1);
    assert!(submit(&video, 2, 2, 2));
    wait_rendered(&video, 2);

    let log = log.lock();
    assert_eq!(log.textures, vec![(vec![9; 16], 2, 2)]);
    assert_eq!(log.texture_enable, Some((true, false)));
    assert_eq!(log.state_changes, 1);
    assert_eq!(log.aspect_ratios, vec![3]);
    assert_eq!(log.hdr_contrast, vec![5.0]);
}

#[test_log::test]
fn missing_extensions_fail_neutrally() {
    let (mut video, _log) = spawn_mock(
        VideoInfo::default(),
        MockOptions {
            extensions: false,
            ..MockOptions::default()
        },
    );

    assert!(!video.has_overlay());
    assert!(!video.has_poke());
    assert!(!video.overlay_enable(true));
    assert!(!video.get_fbo_state());
    assert!(VideoDriver::overlay(&mut video).is_none());
    assert!(VideoDriver::poke(&mut video).is_none());
    assert!(video.alive());
}

#[test_log::test]
fn input_binder_runs_on_render_thread_after_driver_init() {
    let log = Arc::new(Mutex::new(DriverLog::default()));
    let driver_log = log.clone();
    let config = ThreadConfig {
        thread_name: "video-input".to_string(),
        ..ThreadConfig::default()
    };

    let (video, bound) = ThreadedVideo::spawn(
        VideoInfo::default(),
        config,
        move |info: &VideoInfo| -> Result<MockDriver, String> {
            Ok(MockDriver::new(info, MockOptions::default(), driver_log))
        },
        |driver: &mut MockDriver| {
            (
                thread::current().name().map(str::to_owned),
                driver.viewport_info().size(),
            )
        },
    )
    .expect("mock driver init");

    assert_eq!(
        bound,
        (Some("video-input".to_string()), PhysicalSize::new(640, 480))
    );
    assert_eq!(video.driver_ident(), "mock");

    drop(video);
    assert_eq!(log.lock().dropped_on.as_deref(), Some("video-input"));
}

#[test_log::test]
fn screensaver_request_is_forwarded_by_render_thread() {
    let (video, log) = spawn_mock(VideoInfo::default(), MockOptions::default());

    assert!(video.suppress_screensaver(true));
    assert!(wait_for(SETTLE, || log.lock().screensaver == vec![true]));
}

fn present_through_trait<V: VideoDriver>(driver: &mut V, fill: u8) -> bool {
    let pixels = [fill; 16];
    driver.set_viewport(2, 2, true, false);
    driver.frame(FrameRef {
        pixels: Some(&pixels),
        width: 2,
        height: 2,
        pitch: 8,
        frame_count: 0,
        msg: Some("hello"),
    })
}

#[test_log::test]
fn proxy_is_substitutable_for_the_driver() {
    let (mut video, log) = spawn_mock(VideoInfo::default(), MockOptions::default());

    assert_eq!(VideoDriver::ident(&video), "thread");
    assert!(present_through_trait(&mut video, 4));
    wait_rendered(&video, 1);

    assert_eq!(video.viewport_info().size(), PhysicalSize::new(2, 2));
    let log = log.lock();
    assert_eq!(log.frames[0].first_byte, Some(4));
    assert_eq!(log.frames[0].frame_count, 1);
    assert_eq!(log.frames[0].msg.as_deref(), Some("hello"));
}

#[test_log::test]
fn read_viewport_is_refused_after_unseen_driver_change() {
    let (video, _log) = spawn_mock(VideoInfo::default(), MockOptions::default());

    video.set_viewport(320, 240, false, false);
    assert_eq!(video.viewport_info().size(), PhysicalSize::new(320, 240));

    video.custom_command(|driver| driver.set_viewport(400, 300, false, false));
    assert!(submit(&video, 4, 4, 1));
    wait_rendered(&video, 1);

    let mut buffer = vec![0u8; 400 * 300 * 3];
    assert!(!video.read_viewport(&mut buffer));
    assert_eq!(video.last_read_viewport().size(), PhysicalSize::new(320, 240));

    assert_eq!(video.viewport_info().size(), PhysicalSize::new(400, 300));
    assert!(video.read_viewport(&mut buffer));
    assert!(buffer.iter().all(|&byte| byte == 0xAB));
}

#[test_log::test]
fn unbounded_frame_wait_blocks_until_consumed() {
    let config = ThreadConfig {
        frame_wait_timeout: Duration::MAX,
        ..ThreadConfig::default()
    };
    let (video, log) = spawn_mock_with(
        VideoInfo::default(),
        config,
        MockOptions {
            draw_delay: Duration::from_millis(20),
            ..MockOptions::default()
        },
    );

    for fill in 1..=3 {
        assert!(submit(&video, 4, 4, fill));
    }
    wait_rendered(&video, 3);

    let stats = video.frame_stats();
    assert_eq!(stats.misses, 0);
    assert_eq!(
        log.lock()
            .frames
            .iter()
            .map(|frame| frame.first_byte)
            .collect::<Vec<_>>(),
        vec![Some(1), Some(2), Some(3)]
    );
}

#[test_log::test]
fn slow_driver_init_times_out() {
    let config = ThreadConfig {
        init_timeout: Duration::from_millis(50),
        ..ThreadConfig::default()
    };
    let log = Arc::new(Mutex::new(DriverLog::default()));
    let driver_log = log.clone();

    let started = Instant::now();
    let result = ThreadedVideo::new(
        VideoInfo::default(),
        config,
        move |info: &VideoInfo| -> Result<MockDriver, String> {
            thread::sleep(Duration::from_millis(300));
            Ok(MockDriver::new(info, MockOptions::default(), driver_log))
        },
    );

    match result {
        Err(VideoError::InitTimeout(timeout)) => assert_eq!(timeout, Duration::from_millis(50)),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("init should time out"),
    }
    assert!(started.elapsed() < Duration::from_millis(300));

    assert!(wait_for(SETTLE, || log.lock().dropped_on.is_some()));
}

#[test_log::test]
fn waiting_render_thread_re_presents_at_interval() {
    let config = ThreadConfig {
        present_interval: Some(Duration::from_millis(10)),
        ..ThreadConfig::default()
    };
    let (video, log) = spawn_mock_with(VideoInfo::default(), config, MockOptions::default());

    assert!(submit(&video, 4, 4, 5));
    assert!(wait_for(SETTLE, || log.lock().frames.len() >= 4));
    assert_eq!(video.frame_stats().rendered, 1);

    let log = log.lock();
    assert_eq!(log.frames[0].first_byte, Some(5));
    assert!(log.frames[1..].iter().all(|frame| {
        frame.first_byte.is_none() && frame.frame_count == 1 && frame.msg.is_none()
    }));
}

#[test_log::test]
fn concurrent_free_returns_after_teardown() {
    let (video, log) = spawn_mock(
        VideoInfo::default(),
        MockOptions {
            draw_delay: Duration::from_millis(50),
            ..MockOptions::default()
        },
    );
    let video = Arc::new(video);
    assert!(submit(&video, 4, 4, 1));

    let freers: Vec<_> = (0..4)
        .map(|_| {
            let video = video.clone();
            let log = log.clone();
            thread::spawn(move || {
                video.free();
                log.lock().dropped_on.clone()
            })
        })
        .collect();

    for freer in freers {
        assert_eq!(freer.join().unwrap().as_deref(), Some("video"));
    }
    assert!(!video.alive());
}
