//! Cart commands.

use anyhow::{Context as _, Result};
use turbo_cart::actions::{
    shopping_cart_add, shopping_cart_clear, shopping_cart_pop, shopping_cart_show, CartPayload,
};
use turbo_cart::{CartError, CartFactory, Details, Item, RequestContext};

use super::{CartArgs, ItemArgs};
use crate::context::{Caller, Context};

type Action = fn(&CartFactory, &mut RequestContext, &CartPayload) -> Result<Vec<Item>, CartError>;

fn payload(args: &CartArgs) -> CartPayload {
    let mut payload = CartPayload::new(&args.cart, &args.scope);
    payload.username = args.owner.clone();
    payload
}

fn item_payload(args: &ItemArgs) -> Result<CartPayload> {
    let details: Details =
        serde_json::from_str(&args.details).context("--details must be a JSON object")?;
    Ok(payload(&args.cart).with_item(&args.item, details))
}

fn run(action: Action, payload: &CartPayload, caller: &Caller, ctx: &Context) -> Result<Vec<Item>> {
    let mut request = ctx.request(caller)?;
    let items = action(&ctx.factory, &mut request, payload)
        .with_context(|| format!("Cart {} failed", payload.cart))?;
    ctx.output.items(&format!("Cart {}", payload.cart), &items);
    ctx.finish(request)?;
    Ok(items)
}

/// Run the add command.
pub fn add(args: ItemArgs, caller: &Caller, ctx: &Context) -> Result<()> {
    let payload = item_payload(&args)?;
    run(shopping_cart_add, &payload, caller, ctx)?;
    ctx.output.success(&format!("Added {}", args.item));
    Ok(())
}

/// Run the pop command.
pub fn pop(args: ItemArgs, caller: &Caller, ctx: &Context) -> Result<()> {
    let payload = item_payload(&args)?;
    run(shopping_cart_pop, &payload, caller, ctx)?;
    Ok(())
}

/// Run the show command.
pub fn show(args: CartArgs, caller: &Caller, ctx: &Context) -> Result<()> {
    run(shopping_cart_show, &payload(&args), caller, ctx)?;
    Ok(())
}

/// Run the clear command.
pub fn clear(args: CartArgs, caller: &Caller, ctx: &Context) -> Result<()> {
    run(shopping_cart_clear, &payload(&args), caller, ctx)?;
    ctx.output.success(&format!("Dropped cart {}", args.cart));
    Ok(())
}
