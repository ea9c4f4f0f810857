mod common;

use bridge_traits::PromptChoice;
use common::{drain_lifecycle, eventually, Host};
use core_runtime::config::ContentSettings;
use core_runtime::events::LifecycleEvent;
use core_shell::{SessionStage, ShellOrchestrator};
use core_surface::SurfaceState;
use std::time::Duration;

async fn orchestrator(host: &Host) -> ShellOrchestrator {
    ShellOrchestrator::builder(host.config().await)
        .crash_capture(false)
        .build()
}

fn game_url() -> String {
    ContentSettings::default().content_url
}

#[tokio::test]
async fn test_splash_hands_over_to_content_after_delay() {
    let host = Host::new(true);
    let shell = orchestrator(&host).await;
    let mut rx = shell.events().subscribe();
    tokio::time::pause();

    shell.start().await;
    assert_eq!(shell.stage(), SessionStage::Splash);
    assert_eq!(host.chrome.calls().first().map(String::as_str), Some("splash"));

    tokio::time::sleep(Duration::from_millis(2400)).await;
    host.settle().await;
    assert_eq!(shell.stage(), SessionStage::Splash);
    assert!(host.factory.content_loads().is_empty());

    tokio::time::sleep(Duration::from_millis(200)).await;
    host.settle().await;
    assert_eq!(shell.stage(), SessionStage::Content);
    assert_eq!(host.factory.content_loads(), vec![game_url()]);

    // The warm spare was promoted; no second renderer was created.
    assert_eq!(host.factory.created().len(), 1);
    let events = drain_lifecycle(&mut rx);
    assert_eq!(events.first(), Some(&LifecycleEvent::SplashShown));
    assert!(events.iter().any(|e| matches!(e, LifecycleEvent::PreWarmed { .. })));
    assert!(events.iter().any(|e| matches!(
        e,
        LifecycleEvent::ContentEntered {
            promoted_spare: true,
            ..
        }
    )));

    let mode = host.display.mode();
    assert!(mode.immersive && mode.keep_screen_on);

    // Ten steps, ending at exactly 100 and never repeated.
    let progress = host.chrome.splash_progress();
    assert_eq!(progress.len(), 10);
    assert_eq!(progress.last().map(String::as_str), Some("splash:100"));
    tokio::time::sleep(Duration::from_secs(5)).await;
    host.settle().await;
    assert_eq!(host.chrome.splash_progress(), progress);

    shell.on_teardown().await;
}

#[tokio::test]
async fn test_promoted_spare_first_page_has_no_back_entry() {
    let host = Host::new(true);
    let shell = orchestrator(&host).await;
    tokio::time::pause();

    shell.start().await;
    tokio::time::sleep(Duration::from_millis(2600)).await;
    host.settle().await;

    assert_eq!(host.factory.created().len(), 1);
    let surface = shell.surface().await.unwrap();
    assert_eq!(surface.current_url().await, Some(game_url()));
    assert_eq!(shell.session().await.navigation_history_depth, 1);

    shell.on_back_pressed().await;

    assert_eq!(host.dialogs.menus_shown(), 1);
    assert_eq!(surface.current_url().await, Some(game_url()));
    assert!(surface.shows_content().await);

    shell.on_teardown().await;
}

#[tokio::test]
async fn test_early_transition_supersedes_scheduled_one() {
    let host = Host::new(true);
    let shell = orchestrator(&host).await;
    tokio::time::pause();

    shell.start().await;
    shell.transition_to_content().await.unwrap();
    shell.transition_to_content().await.unwrap();

    tokio::time::sleep(Duration::from_secs(3)).await;
    host.settle().await;

    assert_eq!(host.factory.content_loads().len(), 1);
    shell.on_teardown().await;
}

#[tokio::test]
async fn test_offline_start_loads_exactly_once_when_network_returns() {
    let host = Host::new(false);
    let shell = orchestrator(&host).await;

    shell.transition_to_content().await.unwrap();
    host.settle().await;

    assert!(host.factory.content_loads().is_empty());
    eventually("no-network prompt", || {
        host.dialogs.prompt_titles() == vec!["No Network Connection".to_string()]
    })
    .await;

    host.network.set_online(true);
    eventually("game load", || !host.factory.content_loads().is_empty()).await;
    host.settle().await;

    // Content is already shown, so a second availability signal is ignored.
    host.network.set_online(true);
    tokio::time::sleep(Duration::from_millis(50)).await;
    host.settle().await;

    assert_eq!(host.factory.content_loads(), vec![game_url()]);
    shell.on_teardown().await;
}

#[tokio::test]
async fn test_network_loss_prompts_and_exit_ends_session() {
    let host = Host::new(true);
    let shell = orchestrator(&host).await;
    let mut rx = shell.events().subscribe();

    shell.transition_to_content().await.unwrap();
    host.settle().await;
    assert!(!shell.exit_requested());

    host.dialogs.answer(PromptChoice::Exit);
    host.network.set_online(false);

    tokio::time::timeout(Duration::from_secs(2), shell.wait_for_exit())
        .await
        .expect("exit requested");
    assert!(shell.exit_requested());
    assert_eq!(host.dialogs.prompt_titles(), vec!["No Network Connection".to_string()]);
    assert!(drain_lifecycle(&mut rx).contains(&LifecycleEvent::ExitRequested));

    shell.on_teardown().await;
}

#[tokio::test]
async fn test_retry_while_still_offline_prompts_again() {
    let host = Host::new(true);
    let shell = orchestrator(&host).await;

    shell.transition_to_content().await.unwrap();
    host.settle().await;

    host.dialogs.answer(PromptChoice::Retry);
    host.network.set_online(false);

    eventually("second prompt", || host.dialogs.prompt_titles().len() == 2).await;
    assert_eq!(host.factory.content_loads().len(), 1);
    assert!(!shell.exit_requested());

    shell.on_teardown().await;
}

#[tokio::test]
async fn test_retry_after_network_returns_reloads_game() {
    let host = Host::new(false);
    let shell = orchestrator(&host).await;

    shell.transition_to_content().await.unwrap();
    eventually("no-network prompt", || host.dialogs.prompt_titles().len() == 1).await;

    // No change notification, so only the retry path can load.
    host.network.set_online_quietly(true);
    host.dialogs.answer(PromptChoice::Retry);

    eventually("retry load", || host.factory.content_loads().len() == 1).await;
    assert_eq!(host.dialogs.prompt_titles().len(), 1);
    shell.on_teardown().await;
}

#[tokio::test]
async fn test_initialization_failure_prompts_and_retry_recreates() {
    let host = Host::new(true);
    let shell = orchestrator(&host).await;
    let mut rx = shell.events().subscribe();

    host.factory.fail_next(1);
    host.dialogs.answer(PromptChoice::Retry);

    assert!(shell.transition_to_content().await.is_err());
    eventually("recreated content", || host.factory.content_loads().len() == 1).await;

    assert_eq!(
        host.dialogs.prompt_titles(),
        vec!["Initialization Failed".to_string()]
    );
    let events = drain_lifecycle(&mut rx);
    assert!(events
        .iter()
        .any(|e| matches!(e, LifecycleEvent::InitializationFailed { .. })));
    assert!(events.iter().any(|e| matches!(
        e,
        LifecycleEvent::ContentEntered {
            promoted_spare: false,
            ..
        }
    )));

    shell.on_teardown().await;
}

#[tokio::test]
async fn test_initialization_failure_exit() {
    let host = Host::new(true);
    let shell = orchestrator(&host).await;

    host.factory.fail_next(1);
    host.dialogs.answer(PromptChoice::Exit);

    assert!(shell.transition_to_content().await.is_err());
    tokio::time::timeout(Duration::from_secs(2), shell.wait_for_exit())
        .await
        .expect("exit requested");
    assert!(host.factory.content_loads().is_empty());

    shell.on_teardown().await;
}

#[tokio::test]
async fn test_teardown_releases_everything_once() {
    let host = Host::new(true);
    let shell = orchestrator(&host).await;
    let mut rx = shell.events().subscribe();

    shell.start().await;
    shell.transition_to_content().await.unwrap();
    host.settle().await;
    assert_eq!(host.network.subscriber_count(), 1);

    shell.on_teardown().await;
    shell.on_teardown().await;

    assert_eq!(shell.stage(), SessionStage::TornDown);
    for renderer in host.factory.created() {
        assert!(renderer.is_destroyed());
    }
    assert_eq!(host.network.subscriber_count(), 0);
    assert!(shell.surface().await.is_none());

    let torn_down = drain_lifecycle(&mut rx)
        .into_iter()
        .filter(|e| *e == LifecycleEvent::TornDown)
        .count();
    assert_eq!(torn_down, 1);

    // Nothing comes back to life afterwards.
    shell.transition_to_content().await.unwrap();
    shell.on_foreground().await;
    assert!(shell.surface().await.is_none());
}

#[tokio::test]
async fn test_teardown_during_splash_discards_spare() {
    let host = Host::new(true);
    let shell = orchestrator(&host).await;
    let mut rx = shell.events().subscribe();
    tokio::time::pause();

    shell.start().await;
    shell.on_teardown().await;

    tokio::time::sleep(Duration::from_secs(3)).await;
    host.settle().await;

    assert!(host.factory.content_loads().is_empty());
    for renderer in host.factory.created() {
        assert!(renderer.is_destroyed());
    }
    let events = drain_lifecycle(&mut rx);
    assert!(!events
        .iter()
        .any(|e| matches!(e, LifecycleEvent::ContentEntered { .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, LifecycleEvent::SpareDiscarded { .. })));
}

#[tokio::test]
async fn test_foreground_and_background_without_renderer() {
    let host = Host::new(true);
    let shell = orchestrator(&host).await;

    shell.on_background().await;
    shell.on_foreground().await;

    let session = shell.session().await;
    assert!(session.is_foreground);
    assert_eq!(session.surface_state, SurfaceState::Unloaded);
    assert_eq!(session.navigation_history_depth, 0);
}

#[tokio::test]
async fn test_background_pauses_renderer() {
    let host = Host::new(true);
    let shell = orchestrator(&host).await;

    shell.transition_to_content().await.unwrap();
    host.settle().await;
    let renderer = host.factory.created().pop().unwrap();

    shell.on_background().await;
    assert!(renderer.is_paused());
    assert!(!shell.session().await.is_foreground);

    shell.on_foreground().await;
    assert!(!renderer.is_paused());

    let session = shell.session().await;
    assert_eq!(session.stage, SessionStage::Content);
    assert_eq!(session.navigation_history_depth, 1);

    shell.on_teardown().await;
}
