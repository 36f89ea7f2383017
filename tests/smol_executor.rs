use std::time::Duration;

use coflow::{Resume, Yielded, async_exec, routine::from_fn};
use macro_rules_attribute::apply;
use smol::Timer;
use smol_macros::{Executor, test};

#[apply(test!)]
async fn runs_on_smol(ex: &Executor<'_>) {
    let run = async_exec(|| {
        from_fn(|input: Resume<u64, String>| match input {
            Resume::Start => Ok(Yielded::pending(async {
                Timer::after(Duration::from_millis(10)).await;
                Ok::<_, String>(21)
            })),
            Resume::Value(v) => Ok(Yielded::Done(v * 2)),
            Resume::Failure(e) => Err(e),
        })
    });

    let r = ex.spawn(run).await;
    assert_eq!(r, Ok(42), "Trampoline should not depend on the executor");
}

#[test]
fn runs_on_futures_lite() {
    let run = async_exec(|| {
        from_fn(|input: Resume<&'static str, String>| match input {
            Resume::Start => Ok(Yielded::Ready("ready")),
            Resume::Value(v) => Ok(Yielded::Done(v.len())),
            Resume::Failure(e) => Err(e),
        })
    });
    assert_eq!(futures_lite::future::block_on(run), Ok(5));
}
