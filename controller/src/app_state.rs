use ractor::{Actor, ActorRef};
use shared_types::ControllerConfiguration;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::actors::coordinator::{
    wire_receiver, ControllerActor, ControllerArguments, ControllerMsg, ControllerOptions,
};
use crate::actors::receiver::MessageReceiver;
use crate::actors::sender::MessageSender;
use crate::actors::surface::HostSurface;
use crate::fetch::ConfigSource;
use crate::launch::LaunchParameters;
use crate::transport::WsTransport;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    controller_config: ControllerConfiguration,
    config_source: Arc<dyn ConfigSource>,
    launch: LaunchParameters,
    options: ControllerOptions,
    transport: WsTransport,
    controller: Mutex<Option<ControllerHandle>>,
}

/// The running controller and the receiver wired to it
#[derive(Clone)]
pub struct ControllerHandle {
    pub actor: ActorRef<ControllerMsg>,
    pub receiver: Arc<MessageReceiver>,
}

impl AppState {
    pub fn new(
        controller_config: ControllerConfiguration,
        config_source: Arc<dyn ConfigSource>,
        launch: LaunchParameters,
        options: ControllerOptions,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                controller_config,
                config_source,
                launch,
                options,
                transport: WsTransport::new(),
                controller: Mutex::new(None),
            }),
        }
    }

    pub fn controller_config(&self) -> &ControllerConfiguration {
        &self.inner.controller_config
    }

    pub fn transport(&self) -> &WsTransport {
        &self.inner.transport
    }


    pub async fn ensure_controller(&self) -> Result<ControllerHandle, String> {
        let mut guard = self.inner.controller.lock().await;
        if let Some(handle) = guard.as_ref() {
            return Ok(handle.clone());
        }

        let sender = MessageSender::new(Arc::new(self.inner.transport.clone()));
        let (actor, _) = Actor::spawn(
            Some(format!("controller:{}", ulid::Ulid::new())),
            ControllerActor,
            ControllerArguments {
                controller_config: self.inner.controller_config.clone(),
                config_source: self.inner.config_source.clone(),
                sender: sender.clone(),
                surface: Arc::new(HostSurface::new(sender)),
                launch: self.inner.launch.clone(),
                options: self.inner.options.clone(),
            },
        )
        .await
        .map_err(|e| e.to_string())?;

        let mut receiver = MessageReceiver::new(self.inner.options.trusted_origin.clone());
        wire_receiver(&mut receiver, actor.clone());

        let handle = ControllerHandle {
            actor,
            receiver: Arc::new(receiver),
        };
        *guard = Some(handle.clone());
        Ok(handle)
    }
}
