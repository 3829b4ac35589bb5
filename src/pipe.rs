use crate::config::Config;
use crate::err::StreamErr;
use crossbeam_channel::{Receiver, Sender, bounded, select};
use itertools::Itertools;
use std::any::Any;
use std::fmt;
use std::panic;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use tracing::{debug, trace, warn};

/// 停止信号，发送端被丢弃后所有接收端立即就绪，从不传递数据。
pub(crate) type Shutdown = Receiver<()>;

type Launcher<T> = Box<dyn FnOnce(&mut Launch) -> Inlet<T> + Send>;

/// 惰性流水线。
///
/// 每个中间操作消费当前阶段并返回追加了新阶段的流水线，终止操作消费整条流水线并启动执行：
/// 源阶段和每个中间阶段各占一个工作线程，阶段之间通过通道按到达顺序交接数据。
#[must_use = "streams are lazy and do nothing unless a terminal operation consumes them"]
pub struct Stream<T> {
    launcher: Launcher<T>,
    depth: usize,
    config: Config,
}

impl<T> fmt::Debug for Stream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream").field("depth", &self.depth).field("config", &self.config).finish_non_exhaustive()
    }
}

impl<T: Send + 'static> Stream<T> {
    /// 创建源阶段，`source`在源工作线程内调用，其返回的迭代器按原始顺序逐个推送到下游。
    pub(crate) fn source<I, F>(stage: &'static str, source: F) -> Stream<T>
    where
        F: FnOnce(&Shutdown) -> I + Send + 'static,
        I: Iterator<Item = T>,
    {
        Stream {
            depth: 0,
            config: Config::default(),
            launcher: Box::new(move |launch: &mut Launch| {
                let (outlet, inlet) = launch.channel();
                let shutdown = launch.shutdown.clone();
                launch.spawn(stage, 0, move || pump(source(&shutdown), outlet, stage, 0));
                inlet
            }),
        }
    }

    /// 追加一个阶段，`body`在该阶段的工作线程内以上游入口为输入构造输出迭代器。
    pub(crate) fn stage<U, I, F>(self, stage: &'static str, body: F) -> Stream<U>
    where
        U: Send + 'static,
        F: FnOnce(Inlet<T>) -> I + Send + 'static,
        I: Iterator<Item = U>,
    {
        self.stage_with_cutoff(stage, move |inlet, _| body(inlet))
    }

    /// 同[`Stream::stage`]，`body`额外获得本阶段的[`Cutoff`]，用于声明结果已经确定。
    pub(crate) fn stage_with_cutoff<U, I, F>(self, stage: &'static str, body: F) -> Stream<U>
    where
        U: Send + 'static,
        F: FnOnce(Inlet<T>, Cutoff) -> I + Send + 'static,
        I: Iterator<Item = U>,
    {
        let Stream { launcher, depth, config } = self;
        let depth = depth + 1;
        Stream {
            depth,
            config,
            launcher: Box::new(move |launch: &mut Launch| {
                let inlet = launcher(launch);
                let cutoff = Cutoff { depth, deepest: launch.cutoff.clone() };
                let (outlet, next) = launch.channel();
                launch.spawn(stage, depth, move || pump(body(inlet, cutoff), outlet, stage, depth));
                next
            }),
        }
    }

    /// 指定执行配置，执行时以最后一次指定的配置为准。
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// 当前阶段到源阶段的距离，源阶段为0。
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// 启动整条流水线，返回末端入口，由调用线程作为终止阶段消费。
    pub(crate) fn execute(self) -> Execution<T> {
        let (shutdown_tx, shutdown_rx) = bounded::<()>(0);
        let mut launch = Launch {
            config: self.config,
            shutdown: shutdown_rx,
            workers: Vec::new(),
            live: Arc::default(),
            cutoff: Arc::default(),
        };
        debug!(depth = self.depth, capacity = launch.config.capacity, "launch stream pipeline");
        let inlet = (self.launcher)(&mut launch);
        Execution {
            inlet: Some(inlet),
            shutdown: Some(shutdown_tx),
            workers: launch.workers,
            live: launch.live,
            cutoff: launch.cutoff,
            depth: self.depth,
        }
    }
}

/// 阶段入口，按到达顺序读取上游数据；上游关闭或收到停止信号后结束。
pub(crate) struct Inlet<T> {
    rx: Receiver<T>,
    shutdown: Shutdown,
    done: bool,
}

impl<T> Inlet<T> {
    pub(crate) fn new(rx: Receiver<T>, shutdown: Shutdown) -> Self {
        Inlet { rx, shutdown, done: false }
    }
}

impl<T> Iterator for Inlet<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = select! {
            recv(self.rx) -> item => item.ok(),
            recv(self.shutdown) -> _ => None,
        };
        self.done = item.is_none();
        item
    }
}

/// 阶段出口。
pub(crate) struct Outlet<T> {
    tx: Sender<T>,
    shutdown: Shutdown,
}

impl<T> Outlet<T> {
    /// 阻塞直到下游接收，返回`false`表示下游已关闭或已收到停止信号。
    fn push(&self, item: T) -> bool {
        select! {
            send(self.tx, item) -> res => res.is_ok(),
            recv(self.shutdown) -> _ => false,
        }
    }
}

fn pump<U>(items: impl Iterator<Item = U>, outlet: Outlet<U>, stage: &'static str, depth: usize) {
    for item in items {
        if !outlet.push(item) {
            trace!(stage, depth, "downstream closed, worker exits early");
            return;
        }
    }
    trace!(stage, depth, "input exhausted, worker exits");
}

struct Worker {
    stage: &'static str,
    depth: usize,
    handle: JoinHandle<()>,
}

/// 存活工作线程计数，线程结束（包括panic）时递减。
struct LiveGuard(Arc<AtomicUsize>);

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// 阶段已经取得决定结果所需的全部元素，此后上游的panic不再影响结果。
///
/// 同一次执行中记录已满足阶段的最大深度，为0表示没有阶段被满足。
pub(crate) struct Cutoff {
    depth: usize,
    deepest: Arc<AtomicUsize>,
}

impl Cutoff {
    pub(crate) fn reach(&self) {
        self.deepest.fetch_max(self.depth, Ordering::SeqCst);
    }
}

/// 一次执行的启动上下文。
pub(crate) struct Launch {
    config: Config,
    shutdown: Shutdown,
    workers: Vec<Worker>,
    live: Arc<AtomicUsize>,
    cutoff: Arc<AtomicUsize>,
}

impl Launch {
    fn channel<T>(&self) -> (Outlet<T>, Inlet<T>) {
        let (tx, rx) = bounded(self.config.capacity);
        (Outlet { tx, shutdown: self.shutdown.clone() }, Inlet::new(rx, self.shutdown.clone()))
    }

    fn spawn(&mut self, stage: &'static str, depth: usize, work: impl FnOnce() + Send + 'static) {
        let mut builder = thread::Builder::new().name(format!("{}-{}-{}", self.config.thread_name, depth, stage));
        if let Some(stack_size) = self.config.stack_size {
            builder = builder.stack_size(stack_size);
        }
        self.live.fetch_add(1, Ordering::SeqCst);
        let guard = LiveGuard(self.live.clone());
        let spawned = builder.spawn(move || {
            let _guard = guard;
            work();
        });
        match spawned {
            Ok(handle) => {
                debug!(stage, depth, rendezvous = self.config.is_rendezvous(), "stage worker spawned");
                self.workers.push(Worker { stage, depth, handle });
            }
            Err(err) => StreamErr::SpawnWorker { stage, depth, err: err.to_string() }.termination(),
        }
    }
}

/// 正在执行的流水线，由终止操作在调用线程上消费。
///
/// 结束时（正常耗尽、短路返回或消费者panic）依次关闭末端入口、触发停止信号并等待全部工作线程退出。
pub(crate) struct Execution<T> {
    inlet: Option<Inlet<T>>,
    shutdown: Option<Sender<()>>,
    workers: Vec<Worker>,
    live: Arc<AtomicUsize>,
    cutoff: Arc<AtomicUsize>,
    depth: usize,
}

impl<T> Iterator for Execution<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inlet.as_mut()?.next()
    }
}

impl<T> Execution<T> {
    /// 结束执行。`short_circuited`为`true`表示结果已由此前的元素确定，此后上游的panic只记录不传播；
    /// 否则将第一个panic在调用线程上重新抛出，但已满足阶段（见[`Cutoff`]）上游的panic同样只记录。
    pub(crate) fn finish(mut self, short_circuited: bool) {
        if let Some(payload) = self.stop(short_circuited) {
            panic::resume_unwind(payload);
        }
    }

    pub(crate) fn live_workers(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    fn stop(&mut self, short_circuited: bool) -> Option<Box<dyn Any + Send>> {
        if self.shutdown.is_none() {
            return None;
        }
        self.inlet.take();
        self.shutdown.take();
        let joined =
            self.workers.drain(..).map(|worker| (worker.stage, worker.depth, worker.handle.join())).collect_vec();
        // 满足阶段在输出最后一个元素前登记，全部线程回收后读取
        let cutoff = self.cutoff.load(Ordering::SeqCst);
        let mut first_panic = None;
        for (stage, depth, res) in joined {
            if let Err(payload) = res {
                if short_circuited || depth < cutoff || first_panic.is_some() {
                    warn!(stage, depth, reason = panic_message(&*payload), "ignore panic of stage worker");
                } else {
                    first_panic = Some(payload);
                }
            }
        }
        debug!(depth = self.depth, live = self.live_workers(), short_circuited, cutoff, "stream pipeline drained");
        first_panic
    }
}

impl<T> Drop for Execution<T> {
    fn drop(&mut self) {
        self.stop(true);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "<non-string panic payload>"
    }
}
