mod health_check;
mod helpers;
mod promotions;
mod visitor;
