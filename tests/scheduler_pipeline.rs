//! 分块处理管道集成测试
//!
//! 从服务初始化到DOM修改的完整流程，使用手动时钟宿主

use std::rc::Rc;
use std::time::Duration;

use rwb::parsers::html::dom::text_content;
use rwb::word_break::host::{ManualHost, TokioHost};
use rwb::word_break::pipeline::{collect_units, NoProgress, NodeFilter, RunOutcome};
use rwb::word_break::{WordBreakConfig, WordBreakError, WordBreakService};

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::{HtmlTestHelper, ProgressRecorder, TestConfigBuilder, TokenizerFixture};

async fn bootstrap(
    config: WordBreakConfig,
    host: Rc<ManualHost>,
    recorder: Rc<ProgressRecorder>,
) -> WordBreakService {
    let tokenizer = TokenizerFixture::script();
    WordBreakService::bootstrap(
        config,
        async move { Ok::<_, WordBreakError>(tokenizer) },
        host,
        recorder,
    )
    .await
    .expect("服务初始化失败")
}

fn paragraphs(count: usize) -> String {
    (0..count).map(|i| format!("<p>第{}段落です</p>", i)).collect()
}

#[tokio::test]
async fn test_batches_report_progress_and_yield() {
    let host = Rc::new(ManualHost::new());
    let recorder = Rc::new(ProgressRecorder::default());
    let service = bootstrap(
        TestConfigBuilder::new().with_batch_size(10).build(),
        host.clone(),
        recorder.clone(),
    )
    .await;
    let dom = HtmlTestHelper::create_test_dom(&paragraphs(25));

    let summary = service.process_document(&dom).await;

    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(summary.total, 25);
    assert_eq!(summary.processed, 25);
    assert_eq!(summary.batches, 3);
    assert_eq!(*recorder.reports.borrow(), vec![40.0, 80.0, 100.0]);
    assert_eq!(recorder.finished.get(), 1);
    assert_eq!(host.frames(), 3);
    assert_eq!(
        host.sleeps(),
        vec![Duration::from_millis(10), Duration::from_millis(10)]
    );
}

#[tokio::test]
async fn test_output_markup_is_bit_exact() {
    let service = bootstrap(
        WordBreakConfig::default(),
        Rc::new(ManualHost::new()),
        Rc::new(ProgressRecorder::default()),
    )
    .await;
    let dom = HtmlTestHelper::create_test_dom("<p>猫が好き</p>");

    service.process_document(&dom).await;

    assert_eq!(
        HtmlTestHelper::body_html(&dom),
        concat!(
            r#"<p data-rwb-processed="true"><span data-rwb-processed="true">"#,
            r#"<span class="word-wrapper">猫が</span>"#,
            r#"<span class="word-wrapper">好き</span>"#,
            r#"</span></p>"#,
        )
    );
}

#[tokio::test]
async fn test_second_pass_is_a_no_op() {
    let service = bootstrap(
        WordBreakConfig::default(),
        Rc::new(ManualHost::new()),
        Rc::new(ProgressRecorder::default()),
    )
    .await;
    let dom = HtmlTestHelper::create_test_dom("<p>吾輩は猫である。</p><div>名前は<b>まだ</b>無い。</div>");

    let first = service.process_document(&dom).await;
    let after_first = HtmlTestHelper::body_html(&dom);
    let second = service.process_document(&dom).await;

    assert_eq!(first.processed, 4);
    assert_eq!(second.total, 0);
    assert_eq!(HtmlTestHelper::body_html(&dom), after_first);
}

#[tokio::test]
async fn test_excluded_and_tooling_content_untouched() {
    let service = bootstrap(
        WordBreakConfig::default(),
        Rc::new(ManualHost::new()),
        Rc::new(ProgressRecorder::default()),
    )
    .await;
    let body = concat!(
        "<script>var s = \"猫\";</script>",
        "<pre>整形済み</pre>",
        "<p>説明<code>コード</code></p>",
        "<div id=\"__debug-panel\">デバッグ</div>",
        "<div class=\"debug-tools\">ツール</div>",
        "<button title=\"送信\">送信</button>",
        "<textarea>入力欄</textarea>",
        "<p>本文です</p>",
    );
    let dom = HtmlTestHelper::create_test_dom(body);

    let summary = service.process_document(&dom).await;
    let html = HtmlTestHelper::body_html(&dom);

    assert_eq!(summary.processed, 2);
    assert!(html.contains("<pre>整形済み</pre>"));
    assert!(html.contains("<code>コード</code>"));
    assert!(html.contains("<div id=\"__debug-panel\">デバッグ</div>"));
    assert!(html.contains("<button title=\"送信\">送信</button>"));
    assert_eq!(service.get_stats().collection.rejected_attribute, 1);
    assert!(text_content(&HtmlTestHelper::body(&dom)).contains("本文です"));
}

#[tokio::test]
async fn test_target_selectors_limit_scope() {
    let service = bootstrap(
        TestConfigBuilder::new().with_targets("#content, .comment").build(),
        Rc::new(ManualHost::new()),
        Rc::new(ProgressRecorder::default()),
    )
    .await;
    let dom = HtmlTestHelper::create_test_dom(
        "<header>見出し</header><main id=\"content\"><p>本文</p></main><aside class=\"comment\">感想</aside>",
    );

    let summary = service.process_document(&dom).await;
    let html = HtmlTestHelper::body_html(&dom);

    assert_eq!(summary.processed, 2);
    assert!(html.contains("<header>見出し</header>"));
    assert_eq!(HtmlTestHelper::count_words(&html), 2);
}

#[tokio::test]
async fn test_timeout_stops_between_batches() {
    let host = Rc::new(ManualHost::with_frame_cost(Duration::from_millis(40)));
    let recorder = Rc::new(ProgressRecorder::default());
    let service = bootstrap(
        TestConfigBuilder::new()
            .with_batch_size(1)
            .with_batch_delay_ms(10)
            .with_timeout_ms(60)
            .build(),
        host.clone(),
        recorder.clone(),
    )
    .await;
    let dom = HtmlTestHelper::create_test_dom(&paragraphs(5));

    let summary = service.process_document(&dom).await;

    assert_eq!(summary.outcome, RunOutcome::TimedOut);
    assert_eq!(summary.completed, 2);
    assert_eq!(summary.processed, 2);
    assert_eq!(*recorder.reports.borrow(), vec![20.0, 40.0]);
    assert_eq!(recorder.finished.get(), 0);
    assert!(!service.scheduler().is_running());
}

#[tokio::test]
async fn test_oversize_text_is_marked_but_not_split() {
    let service = bootstrap(
        TestConfigBuilder::new().with_max_text_length(5).build(),
        Rc::new(ManualHost::new()),
        Rc::new(ProgressRecorder::default()),
    )
    .await;
    let dom = HtmlTestHelper::create_test_dom("<p>とても長い段落の文章です</p><p>短い</p>");

    let summary = service.process_document(&dom).await;
    let html = HtmlTestHelper::body_html(&dom);

    assert_eq!(summary.skipped_oversize, 1);
    assert_eq!(summary.processed, 1);
    assert!(html.contains(r#"<p data-rwb-processed="true">とても長い段落の文章です</p>"#));

    let again = service.process_document(&dom).await;
    assert_eq!(again.total, 0);
}

#[tokio::test(start_paused = true)]
async fn test_overlapping_run_is_refused() {
    let service = WordBreakService::bootstrap(
        WordBreakConfig::default(),
        async { Ok::<_, WordBreakError>(TokenizerFixture::script()) },
        Rc::new(TokioHost),
        Rc::new(NoProgress),
    )
    .await
    .expect("服务初始化失败");
    let scheduler = service.scheduler();
    let dom = HtmlTestHelper::create_test_dom(&paragraphs(3));
    let filter = NodeFilter::default();

    let first_units = collect_units(&dom.document, &filter);
    let second_units = collect_units(&dom.document, &filter);
    let (first, second) = tokio::join!(scheduler.run(first_units), scheduler.run(second_units));

    assert_eq!(first.outcome, RunOutcome::Completed);
    assert_eq!(first.processed, 3);
    assert_eq!(second.outcome, RunOutcome::AlreadyRunning);
    assert_eq!(second.processed, 0);
}
