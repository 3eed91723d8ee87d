
use helper::Context;
use pretty_assertions::assert_eq;
use testing_utils::{
    macros as utils,
    surf::{self, StatusCode},
};

const COOKIE: &str = "TRELLISSESSID";

async fn before_each() -> Context {
    helper::setup("session", |settings| settings).await
}

async fn after_each(_ctx: ()) {}

fn session_cookie(response: &surf::Response) -> Option<String> {
    response
        .header("Set-Cookie")?
        .iter()
        .map(|value| value.as_str())
        .find(|value| value.starts_with(COOKIE))
        .and_then(|value| value.split(';').next())
        .map(|pair| pair.to_string())
}

async fn login(ctx: &Context, password: &str) -> surf::Response {
    surf::post(ctx.url("/login"))
        .body_string(format!("user=alice&password={password}"))
        .content_type("application/x-www-form-urlencoded")
        .await
        .unwrap()
}

#[utils::test(setup = before_each, teardown = after_each)]
async fn should_reject_invalid_credentials(ctx: Context) {
    let mut response = login(&ctx, "wrong").await;
    assert_eq!(response.status(), StatusCode::Forbidden);
    assert_eq!(response.body_string().await.unwrap(), "Invalid credentials.");
    assert_eq!(session_cookie(&response), None);
}

#[utils::test(setup = before_each, teardown = after_each)]
async fn should_keep_authenticated_session(ctx: Context) {
    let response = login(&ctx, "secret").await;
    assert_eq!(response.status(), StatusCode::Found);
    assert_eq!(
        response.header("Location").unwrap().get(0).unwrap().as_str(),
        format!("http://127.0.0.1:{}/", ctx.app)
    );
    let cookie = session_cookie(&response).unwrap();

    let mut response = surf::get(ctx.url("/user/42/edit"))
        .header("Cookie", cookie.as_str())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::Ok);
    assert_eq!(response.body_string().await.unwrap(), "editing 42");
    assert_eq!(session_cookie(&response), None);

    let mut response = surf::get(ctx.url("/"))
        .header("Cookie", cookie.as_str())
        .await
        .unwrap();
    assert_eq!(response.body_string().await.unwrap(), "<main>Hello, alice!</main>");
}

#[utils::test(setup = before_each, teardown = after_each)]
async fn should_forget_destroyed_session(ctx: Context) {
    let cookie = session_cookie(&login(&ctx, "secret").await).unwrap();

    let response = surf::get(ctx.url("/logout"))
        .header("Cookie", cookie.as_str())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::Found);
    assert_eq!(session_cookie(&response), Some(format!("{COOKIE}=")));

    let mut response = surf::get(ctx.url("/user/42/edit"))
        .header("Cookie", cookie.as_str())
        .await
        .unwrap();
    assert_eq!(
        response.body_string().await.unwrap(),
        "login required for /user/42/edit"
    );
}

#[utils::test(setup = before_each, teardown = after_each)]
async fn should_not_adopt_unknown_session(ctx: Context) {
    let mut response = surf::get(ctx.url("/user/42/edit"))
        .header("Cookie", format!("{COOKIE}=forged").as_str())
        .await
        .unwrap();
    assert_eq!(
        response.body_string().await.unwrap(),
        "login required for /user/42/edit"
    );
}
