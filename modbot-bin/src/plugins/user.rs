use async_trait::async_trait;
use chrono::{DateTime, Utc};
use modbot::builder::CreateMessage;
use modbot::model::{Member, User};
use modbot::util::color::Color;
use modbot::{Arguments, Result};
use modbot_core::context::MessageContext;
use modbot_core::module::{Module, ModuleInfo};
use modbot_core::search::{self, Found};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct UserInfo {
    info: ModuleInfo,
}

pub fn new() -> Result<Box<dyn Module>> {
    Ok(Box::new(UserInfo {
        info: ModuleInfo {
            aliases: &["user", "userinfo"],
            category: "Utils",
            usage_doc: "{prefix}{aliases} [user]",
            short_doc: "Get information about given user.",
            ..ModuleInfo::new("user")
        },
    }))
}

#[async_trait]
impl Module for UserInfo {
    fn info(&self) -> &ModuleInfo {
        &self.info
    }

    async fn on_call(&self, ctx: &MessageContext, args: &Arguments) -> Result<Option<CreateMessage>> {
        let found = if args.len() == 1 {
            Some(author(ctx).await)
        } else {
            search::find_member(ctx, args.source_rest(1)).await?
        };

        let found = match found {
            Some(found) => found,
            None => return Ok(Some(CreateMessage::warn("User not found"))),
        };

        let top_role = match found.member() {
            Some(member) => top_role(ctx, member).await?,
            None => None,
        };

        Ok(Some(user_embed(&found, top_role, Utc::now())))
    }
}

/// Returns the author of the event, as a member if possible.
async fn author(ctx: &MessageContext) -> Found {
    let author = &ctx.event.author;

    if let Some(guild_id) = ctx.event.guild_id {
        if let Ok(member) = ctx.client().get_member(guild_id, author.id).await {
            return Found::Member(member);
        }
    }

    Found::User(author.clone())
}

/// Returns the name of the highest role of `member`.
async fn top_role(ctx: &MessageContext, member: &Member) -> Result<Option<String>> {
    if member.roles.is_empty() {
        return Ok(None);
    }

    let roles = ctx.client().get_roles(member.guild_id).await?;

    Ok(roles
        .into_iter()
        .filter(|role| member.roles.contains(&role.id))
        .max_by_key(|role| role.position)
        .map(|role| role.name))
}

fn format_date(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    format!(
        "{} ({} days ago)",
        date.format(DATE_FORMAT),
        (now - date).num_days()
    )
}

fn user_embed(found: &Found, top_role: Option<String>, now: DateTime<Utc>) -> CreateMessage {
    let user: &User = found.user();

    CreateMessage::new(|m| {
        m.embed(|e| {
            match found {
                Found::Member(_) => e.title(format!("{} (member)", user.tag())),
                Found::User(_) => e.title(user.tag()),
            };

            e.color(Color::GOLD);
            e.thumbnail(user.face());
            e.field("registered", format_date(user.id.created_at(), now), false);

            if let Some(member) = found.member() {
                if let Some(joined_at) = member.joined_at {
                    e.field("member since", format_date(joined_at, now), false);
                }

                if let Some(top_role) = &top_role {
                    e.field("top role", top_role, true);
                }

                e.field("total roles", member.roles.len(), true);

                if let Some(nick) = &member.nick {
                    e.field("nick", nick, true);
                }
            }

            e.field("robot", if user.bot { "yes" } else { "no" }, true);
            e.footer(user.id);
        });
    })
}

#[cfg(test)]
mod tests {
    use crate::plugins::testing::{content, dispatch, setup, GUILD};

    use modbot::model::RoleId;
    use modbot_core::testing;

    #[tokio::test(start_paused = true)]
    async fn test_author_member() {
        let (client, state) = setup(&[super::new]).await;

        let mut alice = testing::member(GUILD, testing::user(2, "alice"));
        alice.nick = Some(String::from("ally"));
        alice.roles = vec![RoleId(20), RoleId(21)];
        client.add_member(alice);
        client.add_role(testing::role(GUILD, 20, "low", 1));
        client.add_role(testing::role(GUILD, 21, "high", 5));
        client.add_role(testing::role(GUILD, 22, "highest", 9));

        let resp = dispatch(&state, testing::user(2, "alice"), Some(GUILD), "user")
            .await
            .unwrap();
        let embed = resp.embed.unwrap();

        assert_eq!(embed.title.as_deref(), Some("alice#0001 (member)"));
        assert_eq!(embed.footer.as_deref(), Some("2"));

        let field = |name: &str| {
            embed
                .fields
                .iter()
                .find(|field| field.name == name)
                .map(|field| field.value.clone())
        };
        assert_eq!(field("top role").as_deref(), Some("high"));
        assert_eq!(field("total roles").as_deref(), Some("2"));
        assert_eq!(field("nick").as_deref(), Some("ally"));
        assert_eq!(field("robot").as_deref(), Some("no"));
        assert!(field("member since").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup() {
        let (client, state) = setup(&[super::new]).await;
        client.add_member(testing::member(GUILD, testing::user(3, "bob")));
        client.add_user(testing::user(4, "carol"));

        let resp = dispatch(&state, testing::user(2, "alice"), Some(GUILD), "userinfo BO")
            .await
            .unwrap();
        assert_eq!(
            resp.embed.unwrap().title.as_deref(),
            Some("bob#0001 (member)")
        );

        let resp = dispatch(&state, testing::user(2, "alice"), Some(GUILD), "user <@4>")
            .await
            .unwrap();
        assert_eq!(resp.embed.unwrap().title.as_deref(), Some("carol#0001"));

        assert_eq!(
            content(dispatch(&state, testing::user(2, "alice"), Some(GUILD), "user dave").await)
                .as_deref(),
            Some("⚠ User not found")
        );
    }
}
