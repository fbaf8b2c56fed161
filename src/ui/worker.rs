// 单任务 worker：每类操作同一时间只允许一个在执行

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// 操作类别（每类一个 worker）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionCategory {
    /// 服务启动/停止
    Service,
    /// 组件包更新
    Update,
}

impl ActionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionCategory::Service => "service",
            ActionCategory::Update => "update",
        }
    }
}

/// 提交结果
#[derive(Debug)]
pub enum Dispatch<T> {
    Accepted(JoinHandle<T>),
    /// 同类操作正在执行，本次提交被拒绝
    Rejected,
}

impl<T> Dispatch<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Dispatch::Accepted(_))
    }
}

#[derive(Debug, Default)]
struct FlightState {
    busy: AtomicBool,
    idle: Notify,
}

#[derive(Debug, Clone)]
pub struct SingleFlight {
    category: ActionCategory,
    state: Arc<FlightState>,
}

/// 占用标记；释放（包括任务 panic）时清除标记并唤醒等待者
#[derive(Debug)]
pub struct BusyGuard(Vec<Arc<FlightState>>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        for state in &self.0 {
            state.busy.store(false, Ordering::Release);
            state.idle.notify_waiters();
        }
    }
}

impl SingleFlight {
    pub fn new(category: ActionCategory) -> Self {
        Self {
            category,
            state: Arc::new(FlightState::default()),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.state.busy.load(Ordering::Acquire)
    }

    fn claim(&self) -> bool {
        self.state
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// 同时占用本 worker 和 `also` 中的 worker；任一已被占用则全部不占用
    pub fn try_claim(&self, also: &[&SingleFlight]) -> Option<BusyGuard> {
        let mut guard = BusyGuard(Vec::with_capacity(also.len() + 1));
        for flight in std::iter::once(self).chain(also.iter().copied()) {
            if !flight.claim() {
                tracing::warn!(
                    category = flight.category.as_str(),
                    "操作正在执行，忽略本次请求"
                );
                return None;
            }
            guard.0.push(flight.state.clone());
        }
        Some(guard)
    }

    /// 等待当前占用释放
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.state.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if !self.is_busy() {
                return;
            }
            notified.await;
        }
    }

    /// 空闲时在 tokio 运行时上执行任务，否则拒绝
    pub fn try_spawn<F>(&self, task: F) -> Dispatch<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.try_spawn_with(&[], task)
    }

    /// 同 [`try_spawn`](Self::try_spawn)，但任务执行期间同时占用 `also` 中的 worker
    pub fn try_spawn_with<F>(&self, also: &[&SingleFlight], task: F) -> Dispatch<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let Some(guard) = self.try_claim(also) else {
            return Dispatch::Rejected;
        };

        Dispatch::Accepted(tokio::spawn(async move {
            let _guard = guard;
            task.await
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn second_dispatch_is_rejected_while_busy() {
        let worker = SingleFlight::new(ActionCategory::Update);
        let (release_tx, release_rx) = oneshot::channel::<()>();

        let first = worker.try_spawn(async move {
            let _ = release_rx.await;
            42
        });
        assert!(first.is_accepted());
        assert!(worker.is_busy());

        let second = worker.try_spawn(async { 7 });
        assert!(matches!(second, Dispatch::Rejected));

        release_tx.send(()).unwrap();
        let Dispatch::Accepted(handle) = first else {
            panic!("first dispatch should be accepted");
        };
        assert_eq!(handle.await.unwrap(), 42);
        assert!(!worker.is_busy());

        assert!(worker.try_spawn(async {}).is_accepted());
    }

    #[tokio::test]
    async fn panicking_task_releases_worker() {
        let worker = SingleFlight::new(ActionCategory::Service);

        let Dispatch::Accepted(handle) = worker.try_spawn(async { panic!("boom") }) else {
            panic!("dispatch should be accepted");
        };
        assert!(handle.await.is_err());
        assert!(!worker.is_busy());
    }

    #[tokio::test]
    async fn categories_are_independent() {
        let service = SingleFlight::new(ActionCategory::Service);
        let update = SingleFlight::new(ActionCategory::Update);
        let (tx, rx) = oneshot::channel::<()>();

        assert!(service.try_spawn(async move {
            let _ = rx.await;
        })
        .is_accepted());
        assert!(update.try_spawn(async {}).is_accepted());

        tx.send(()).unwrap();
    }

    #[tokio::test]
    async fn joint_dispatch_blocks_both_workers() {
        let update = SingleFlight::new(ActionCategory::Update);
        let service = SingleFlight::new(ActionCategory::Service);
        let (tx, rx) = oneshot::channel::<()>();

        let joint = update.try_spawn_with(&[&service], async move {
            let _ = rx.await;
        });
        assert!(joint.is_accepted());
        assert!(service.is_busy());
        assert!(!service.try_spawn(async {}).is_accepted());

        tx.send(()).unwrap();
        let Dispatch::Accepted(handle) = joint else {
            panic!("joint dispatch should be accepted");
        };
        handle.await.unwrap();
        assert!(!service.is_busy());
        assert!(!update.is_busy());
    }

    #[tokio::test]
    async fn failed_joint_claim_releases_partial_claims() {
        let update = SingleFlight::new(ActionCategory::Update);
        let service = SingleFlight::new(ActionCategory::Service);
        let held = service.try_claim(&[]).expect("service idle");

        assert!(!update.try_spawn_with(&[&service], async {}).is_accepted());
        assert!(!update.is_busy());

        drop(held);
        assert!(update.try_spawn_with(&[&service], async {}).is_accepted());
    }

    #[tokio::test]
    async fn wait_idle_returns_after_release() {
        let worker = SingleFlight::new(ActionCategory::Service);
        assert!(tokio::time::timeout(Duration::from_millis(50), worker.wait_idle())
            .await
            .is_ok());

        let (tx, rx) = oneshot::channel::<()>();
        assert!(worker
            .try_spawn(async move {
                let _ = rx.await;
            })
            .is_accepted());
        assert!(tokio::time::timeout(Duration::from_millis(50), worker.wait_idle())
            .await
            .is_err());

        tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(5), worker.wait_idle())
            .await
            .unwrap();
    }
}
