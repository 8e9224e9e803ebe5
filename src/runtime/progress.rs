use async_trait::async_trait;

/// 进度通知接收方
///
/// 在执行流水线的同一个任务里依次 await，不与 step 并发。
/// 发送失败由实现方自行记录，不影响流水线。
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn notify(&self, step: &str, label: &str);
}

/// 把同步闭包包装成 `ProgressSink`
pub struct FnProgress<F>(pub F);

#[async_trait]
impl<F> ProgressSink for FnProgress<F>
where
    F: Fn(&str, &str) + Send + Sync,
{
    async fn notify(&self, step: &str, label: &str) {
        (self.0)(step, label)
    }
}
