use std::future::Future;

use aws_sdk_kms::error::DisplayErrorContext;
use kms_cleanup_core::contract::{AliasEntry, AliasPage, KeyDescription, KeyPage, KeyState};
use kms_cleanup_core::report::CleanupNotification;
use kms_cleanup_lambda::adapters::key_service::KeyService;
use kms_cleanup_lambda::adapters::notifier::Notifier;
use kms_cleanup_lambda::config::{CleanupConfig, DEFAULT_LOG_FILTER, LOG_FILTER_VAR};
use kms_cleanup_lambda::handlers::cleanup::{
    handle_scheduled_event, CleanupDependencies, CleanupRunResponse,
};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

struct KmsKeyService {
    kms_client: aws_sdk_kms::Client,
}

struct SnsNotifier {
    topic_arn: String,
    sns_client: aws_sdk_sns::Client,
}

/// Runs an SDK future from the synchronous port methods on the Lambda's
/// multi-thread runtime.
fn block_on_sdk<T>(future: impl Future<Output = Result<T, String>>) -> Result<T, String> {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

impl KeyService for KmsKeyService {
    fn list_aliases_page(&self, marker: Option<&str>) -> Result<AliasPage, String> {
        let client = self.kms_client.clone();
        let marker = marker.map(str::to_string);

        block_on_sdk(async move {
            let output = client
                .list_aliases()
                .set_marker(marker)
                .send()
                .await
                .map_err(|error| format!("ListAliases failed: {}", DisplayErrorContext(&error)))?;

            let aliases = output
                .aliases()
                .iter()
                .map(|entry| AliasEntry {
                    alias_name: entry.alias_name().unwrap_or_default().to_string(),
                    target_key_id: entry.target_key_id().map(str::to_string),
                })
                .collect();
            Ok(AliasPage {
                aliases,
                next_marker: output.next_marker().map(str::to_string),
            })
        })
    }

    fn list_keys_page(&self, marker: Option<&str>) -> Result<KeyPage, String> {
        let client = self.kms_client.clone();
        let marker = marker.map(str::to_string);

        block_on_sdk(async move {
            let output = client
                .list_keys()
                .set_marker(marker)
                .send()
                .await
                .map_err(|error| format!("ListKeys failed: {}", DisplayErrorContext(&error)))?;

            let key_ids = output
                .keys()
                .iter()
                .filter_map(|entry| entry.key_id().map(str::to_string))
                .collect();
            Ok(KeyPage {
                key_ids,
                next_marker: output.next_marker().map(str::to_string),
            })
        })
    }

    fn describe_key(&self, key_id: &str) -> Result<KeyDescription, String> {
        let client = self.kms_client.clone();
        let key_id = key_id.to_string();

        block_on_sdk(async move {
            let output = client
                .describe_key()
                .key_id(&key_id)
                .send()
                .await
                .map_err(|error| format!("DescribeKey failed: {}", DisplayErrorContext(&error)))?;

            let state = output
                .key_metadata()
                .and_then(|metadata| metadata.key_state())
                .map(|state| KeyState::parse(state.as_str()))
                .ok_or_else(|| "DescribeKey returned no key state".to_string())?;
            Ok(KeyDescription { key_id, state })
        })
    }

    fn schedule_key_deletion(&self, key_id: &str, pending_window_days: u8) -> Result<(), String> {
        let client = self.kms_client.clone();
        let key_id = key_id.to_string();

        block_on_sdk(async move {
            client
                .schedule_key_deletion()
                .key_id(key_id)
                .pending_window_in_days(i32::from(pending_window_days))
                .send()
                .await
                .map(|_| ())
                .map_err(|error| {
                    format!("ScheduleKeyDeletion failed: {}", DisplayErrorContext(&error))
                })
        })
    }
}

impl Notifier for SnsNotifier {
    fn publish(&self, notification: &CleanupNotification) -> Result<(), String> {
        let client = self.sns_client.clone();
        let topic_arn = self.topic_arn.clone();
        let subject = notification.subject.clone();
        let message = notification.body.clone();

        block_on_sdk(async move {
            client
                .publish()
                .topic_arn(topic_arn)
                .subject(subject)
                .message(message)
                .send()
                .await
                .map(|_| ())
                .map_err(|error| format!("SNS Publish failed: {}", DisplayErrorContext(&error)))
        })
    }
}

struct RuntimeDependencies {
    config: CleanupConfig,
    key_service: KmsKeyService,
    notifier: Option<SnsNotifier>,
}

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &RuntimeDependencies,
) -> Result<CleanupRunResponse, Error> {
    let run_id = event.context.request_id.clone();
    let cleanup_deps = CleanupDependencies {
        key_service: &deps.key_service,
        notifier: deps
            .notifier
            .as_ref()
            .map(|notifier| notifier as &dyn Notifier),
    };

    Ok(handle_scheduled_event(
        &event.payload,
        &run_id,
        cleanup_deps,
        &deps.config,
    ))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_FILTER_VAR)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_ansi(false).with_current_span(false))
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let config = CleanupConfig::from_env().inspect_err(|config_error| {
        error!(
            component = "runtime",
            event = "config_invalid",
            error = %config_error
        );
    })?;

    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
    if let Some(region) = &config.region {
        loader = loader.region(aws_config::Region::new(region.clone()));
    }
    let aws_config = loader.load().await;

    let notifier = config
        .notification_topic_arn
        .as_ref()
        .map(|topic_arn| SnsNotifier {
            topic_arn: topic_arn.clone(),
            sns_client: aws_sdk_sns::Client::new(&aws_config),
        });
    info!(
        component = "runtime",
        event = "cold_start",
        pending_window_days = config.pending_window_days,
        dry_run = config.dry_run,
        reporter_configured = notifier.is_some()
    );

    let deps = RuntimeDependencies {
        key_service: KmsKeyService {
            kms_client: aws_sdk_kms::Client::new(&aws_config),
        },
        notifier,
        config,
    };
    let deps = &deps;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        handle_request(event, deps).await
    }))
    .await
}
